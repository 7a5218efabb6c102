//! Decisión aleatoria de cada tarea: caída, respuesta incorrecta o correcta.
//!
//! La función es pura: recibe los dos sorteos uniformes ya hechos, así los
//! tests pueden fijarlos sin tocar ningún generador.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Crash,
    Incorrect,
    Correct,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("probabilidad {name} fuera de rango [0, 1]: {value}")]
pub struct InvalidProbability {
    pub name: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities {
    crash: f64,
    incorrect: f64,
}

impl Probabilities {
    pub fn new(crash: f64, incorrect: f64) -> Result<Self, InvalidProbability> {
        check("pcrash", crash)?;
        check("pfail", incorrect)?;
        Ok(Self { crash, incorrect })
    }

    pub fn crash(&self) -> f64 {
        self.crash
    }

    pub fn incorrect(&self) -> f64 {
        self.incorrect
    }
}

fn check(name: &'static str, value: f64) -> Result<(), InvalidProbability> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InvalidProbability { name, value })
    }
}

/// `crash_draw` e `incorrect_draw` son sorteos uniformes en [0, 1).
/// El segundo sólo importa si el primero no produjo una caída.
pub fn decide(crash_draw: f64, incorrect_draw: f64, probs: &Probabilities) -> Decision {
    if crash_draw < probs.crash {
        Decision::Crash
    } else if incorrect_draw < probs.incorrect {
        Decision::Incorrect
    } else {
        Decision::Correct
    }
}

/// Un vector de entrada o un resultado de suma.
pub type Vector = Vec<f32>;

/// Diferencia absoluta máxima aceptada por posición al verificar una respuesta.
pub const TOLERANCE: f32 = 0.001;

/// Suma posición a posición de un lote de vectores.
///
/// El largo del resultado lo fija el primer vector. Los vectores más cortos
/// no aportan nada pasado su final y los más largos se truncan.
/// Lote vacío o primer vector vacío → resultado vacío.
pub fn sum_vectors(vectors: &[Vector]) -> Vector {
    let size = match vectors.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => return Vector::new(),
    };

    let mut result = vec![0.0f32; size];
    for vector in vectors {
        for (acc, value) in result.iter_mut().zip(vector.iter()) {
            *acc += *value;
        }
    }
    result
}

/// Compara una respuesta contra la referencia con tolerancia absoluta.
/// Largos distintos nunca coinciden.
pub fn vectors_match(reference: &[f32], candidate: &[f32]) -> bool {
    if reference.len() != candidate.len() {
        return false;
    }

    reference
        .iter()
        .zip(candidate.iter())
        .all(|(r, c)| (r - c).abs() <= TOLERANCE)
}

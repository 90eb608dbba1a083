//! Formatting utilities

use skinned_data::{Mat4, Vec3};

/// Format a point or direction with fixed precision
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

/// Format one matrix row as space-separated fixed-precision values
pub fn format_matrix_row(m: &Mat4, row: usize) -> String {
    (0..4)
        .map(|col| format!("{:>9.4}", m.get(row, col)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a clip time range in seconds
pub fn format_time_range(start: f32, end: f32) -> String {
    format!("{start:.3}s - {end:.3}s")
}

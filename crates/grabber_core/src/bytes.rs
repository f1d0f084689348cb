const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Human readable byte count: `N/A`, `B`, `KiB`, `MiB` or `GiB`.
pub fn format_bytes(value: Option<u64>) -> String {
    match value {
        Some(bytes) => format_amount(bytes as f64),
        None => "N/A".to_string(),
    }
}

fn format_amount(bytes: f64) -> String {
    if bytes < KIB {
        format!("{} B", bytes as u64)
    } else if bytes < MIB {
        format!("{:.2} KiB", bytes / KIB)
    } else if bytes < GIB {
        format!("{:.2} MiB", bytes / MIB)
    } else {
        format!("{:.2} GiB", bytes / GIB)
    }
}

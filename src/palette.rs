/// Track colors, cycled by day number.
pub const DAY_COLORS: [&str; 8] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#46a5a5", "#f032e6", "#808000",
];

/// Color for a 1-based day number. Day 0 shares day 1's color.
pub fn day_color(day: u32) -> &'static str {
    let slot = day.saturating_sub(1) as usize % DAY_COLORS.len();
    DAY_COLORS[slot]
}

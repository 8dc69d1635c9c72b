use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        chart::VoltageChart,
        command_log::{CommandLogEntry, Kind},
        history::Summary,
        power_cut::PowerCutEvent,
    },
    quantity::{energy::MilliwattHours, voltage::Volts},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_history_table(events: &[PowerCutEvent]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "#", "Device", "Date", "Start", "End", "Duration", "Start V", "End V", "Drop", "Energy",
    ]);
    for (index, event) in (1..).zip(events) {
        let start_time = event.start_time.with_timezone(&chrono::Local);
        let end_time = event.end_time.with_timezone(&chrono::Local);
        table.add_row(vec![
            Cell::new(index).add_attribute(Attribute::Dim),
            Cell::new(&event.device_id),
            Cell::new(start_time.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(start_time.format("%H:%M:%S")),
            Cell::new(end_time.format("%H:%M:%S")).add_attribute(Attribute::Dim),
            Cell::new(format!("{:.2} min", event.duration_minutes()))
                .set_alignment(CellAlignment::Right),
            Cell::new(event.start_voltage).set_alignment(CellAlignment::Right),
            Cell::new(event.end_voltage).set_alignment(CellAlignment::Right),
            Cell::new(event.voltage_drop).set_alignment(CellAlignment::Right),
            Cell::new(event.energy_consumed).set_alignment(CellAlignment::Right).fg(
                if event.energy_consumed > MilliwattHours::ZERO {
                    Color::DarkYellow
                } else {
                    Color::Green
                },
            ),
        ]);
    }
    table
}

pub fn build_summary_table(summary: &Summary, is_degraded: bool) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Power cuts", "Downtime", "Energy", "Average drop"]);
    table.add_row(vec![
        Cell::new(summary.total),
        Cell::new(format!("{:.0} min", summary.total_downtime_minutes)),
        Cell::new(summary.total_energy),
        Cell::new(summary.average_voltage_drop),
    ]);
    if is_degraded {
        table.add_row(vec![
            Cell::new("store is unreachable, showing the local events only").fg(Color::Red),
        ]);
    }
    table
}

/// Side-by-side battery and main voltage samples, oldest first, followed by the averages.
pub fn build_voltage_table(chart: &VoltageChart) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Time", "Battery", "Main"]);
    let samples = chart.battery.labels().zip(chart.battery.iter().zip(chart.main.iter()));
    for (label, (battery, main)) in samples {
        table.add_row(vec![
            Cell::new(label).add_attribute(Attribute::Dim),
            voltage_cell(battery.value),
            voltage_cell(main.value),
        ]);
    }
    table.add_row(vec![
        Cell::new("Average").add_attribute(Attribute::Bold),
        voltage_cell(chart.battery.average().map(Volts)),
        voltage_cell(chart.main.average().map(Volts)),
    ]);
    table
}

fn voltage_cell(voltage: Option<Volts>) -> Cell {
    voltage.map_or_else(
        || Cell::new("n/a").add_attribute(Attribute::Dim),
        |voltage| Cell::new(voltage).set_alignment(CellAlignment::Right),
    )
}

pub fn build_command_log_table<'a>(
    entries: impl IntoIterator<Item = &'a CommandLogEntry>,
) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Time", "Kind", "Message"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"))
                .add_attribute(Attribute::Dim),
            Cell::new(entry.kind).fg(entry.kind.color()),
            Cell::new(&entry.message),
        ]);
    }
    table
}

impl Kind {
    pub const fn color(self) -> Color {
        match self {
            Self::Info => Color::Reset,
            Self::Success => Color::Green,
            Self::Warning => Color::DarkYellow,
            Self::Error => Color::Red,
        }
    }
}

//! Sweep a synthetic day through the engine and print both actuator outputs

use synheart_lumen::config::EXAMPLE_CONFIG_YAML;
use synheart_lumen::{ActuatorKind, LightingEngine, MetricsSnapshot, TimeOfDay};

fn main() {
    let mut engine = match LightingEngine::from_yaml(EXAMPLE_CONFIG_YAML) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    for half_hour in 0..48u32 {
        let minutes = half_hour * 30;
        // Afternoon workout, stressful evening, short night
        let hour = minutes / 60;
        let snapshot = MetricsSnapshot {
            latest_hr: Some(if (15..17).contains(&hour) { 145.0 } else { 68.0 }),
            stress_avg: Some(if (18..21).contains(&hour) { 70.0 } else { 25.0 }),
            sleep_score: Some(62.0),
            ..Default::default()
        };

        let at = TimeOfDay::from_minutes(minutes);
        let (frame, hue) = engine.tick_for(&snapshot, at, ActuatorKind::Hue);
        let rgb = ActuatorKind::RgbStrip
            .encoder()
            .encode_target(&frame.smoothed);

        let hue_line = hue.to_wire_line().unwrap_or_default();
        let rgb_line = rgb.to_wire_line().unwrap_or_default();
        println!(
            "{at} {:<7} I={:.2} CCT={:>4.0}K  {}  {}",
            frame.baseline.period.as_str(),
            frame.smoothed.intensity,
            frame.smoothed.cct_kelvin,
            hue_line.trim_end(),
            rgb_line.trim_end()
        );
    }
}

use hashsweep::{default_worker_sweep, sweep, Settings};

fn main() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "settings.json".to_owned());
    let workers: Vec<usize> = match args.next() {
        Some(raw) => raw
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<usize>().map_err(|_| format!("invalid worker count {s:?}")))
            .collect::<Result<Vec<_>, _>>()?,
        None => default_worker_sweep(),
    };

    let settings = Settings::load(&path).map_err(|e| e.to_string())?;
    let engine = settings
        .engine_builder()
        .build_validated()
        .map_err(|e| e.to_string())?;

    let points = sweep(&engine, &workers).map_err(|e| e.to_string())?;

    println!("workers,found,elapsed_ms,candidates_checked");
    for point in &points {
        println!(
            "{},{},{:.3},{}",
            point.workers,
            point.result.value().unwrap_or("-"),
            point.elapsed.as_secs_f64() * 1000.0,
            point.result.candidates_checked
        );
    }
    Ok(())
}

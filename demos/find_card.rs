use hashsweep::{SearchOutcome, Settings};
use std::time::Duration;

fn main() -> Result<(), String> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "settings.json".to_owned());
    let settings = Settings::load(&path).map_err(|e| e.to_string())?;

    let mut builder = settings.engine_builder();
    // Optional wall-clock limit in seconds.
    if let Some(secs) = std::env::var("HASHSWEEP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
    {
        builder = builder.deadline(Duration::from_secs(secs));
    }
    let engine = builder.build_validated().map_err(|e| e.to_string())?;

    println!(
        "searching bins={:?}, last_numbers={}, algorithm={}, workers={}",
        engine.prefixes, engine.suffix, engine.algorithm, engine.workers
    );
    let result = engine.run().map_err(|e| e.to_string())?;

    match &result.outcome {
        SearchOutcome::Found(value) => {
            std::fs::write(&settings.save_path, value).map_err(|e| e.to_string())?;
            println!(
                "found {} in {:?} ({} candidates), saved to {}",
                value,
                result.elapsed,
                result.candidates_checked,
                settings.save_path.display()
            );
        }
        SearchOutcome::Exhausted => println!(
            "no candidate matched after {} candidates in {:?}",
            result.candidates_checked, result.elapsed
        ),
        SearchOutcome::Cancelled => println!("search timed out after {:?}", result.elapsed),
    }
    Ok(())
}

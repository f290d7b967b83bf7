use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::f64::consts::TAU;
use std::path::Path;
use stereostation::{NormalSampler, DetectionStation, StationConfig};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => StationConfig::from_json_file(Path::new(path))?,
        None => StationConfig::default(),
    };

    let mut station = DetectionStation::new(config)?;
    println!("{station}");

    let radii = station.radii().to_vec();
    let (r_min, r_max) = (radii[0], radii[radii.len() - 1]);
    let mut hit_rng = StdRng::seed_from_u64(43);
    let mut gauss = NormalSampler::new(StdRng::seed_from_u64(42));

    for label in 0..20 {
        let r = hit_rng.gen_range(r_min..r_max);
        let phi = hit_rng.gen_range(0.0..TAU);
        station.digitize([r * phi.cos(), r * phi.sin(), 0.0], label, true, &mut gauss);
    }
    let signal = [0.5 * (r_min + r_max), 1.0, 0.0];
    let signal_ok = station.digitize(signal, 0, false, &mut gauss);

    let stats = station.reconstruct();
    println!(
        "Reconstructed {} coincidences ({} genuine, {} ghosts) from {} hits; signal digitized: {}",
        stats.n_coincidences, stats.n_genuine, stats.n_ghosts, stats.n_hits, signal_ok
    );
    if let Some(s) = station.sink().signal {
        println!(
            "Signal at ({:.3}, {:.3}), killed={}",
            s.position[0],
            s.position[1],
            station.sink().signal_killed
        );
    }
    Ok(())
}

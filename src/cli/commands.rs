//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::io::{self, ModelSnapshot};
use crate::model::{
    reference, LayerSpec, MergeOptions, ModelHeader, ModelKind, Parameter, Placement, VelocityModel,
};

fn save(model: &VelocityModel, source: &Path, output: Option<&Path>) -> Result<()> {
    io::write_model(model, output.unwrap_or(source))
}

/// Print the header and layer table of a model.
pub fn show(path: &Path) -> Result<()> {
    let model = io::read_model(path)?;
    let header = &model.header;

    println!("{} ({})", header.name, header.version);
    println!(
        "{} | {} | {} | {} | {}",
        model.kind(),
        header.unit,
        header.earth,
        header.boundary,
        header.velocity
    );
    println!("{:-<72}", "");

    let params = model.kind().parameters();
    let names: Vec<String> = params.iter().map(|p| format!("{:>8}", p.name())).collect();
    println!("{:>4} {:>9} {:>9}{}", "#", "top", "H", names.join(""));
    for i in 0..model.stack.len() {
        let (Some(top), Some(layer)) = (model.stack.top_of(i), model.stack.layer(i)) else {
            continue;
        };
        let values: Vec<String> = params
            .iter()
            .map(|p| format!("{:>8.3}", layer.get(*p).unwrap_or(f64::NAN)))
            .collect();
        println!(
            "{:>4} {:>9.3} {:>9.3}{}",
            i,
            top,
            model.stack.thickness()[i],
            values.join("")
        );
    }
    println!("{:-<72}", "");
    println!(
        "{} layers, total depth {:.3} km",
        model.stack.len(),
        model.stack.total_depth()
    );

    Ok(())
}

/// Write the built-in AK135 model, or a model loaded from a reference database.
pub fn write_reference(output: &Path, kind: ModelKind, database: Option<&Path>) -> Result<()> {
    let model = match database {
        Some(db) => {
            info!("Loading reference database: {}", db.display());
            let name = db
                .file_stem()
                .map(|s| s.to_string_lossy().to_uppercase())
                .unwrap_or_else(|| "REFERENCE MODEL".to_string());
            VelocityModel::with_stack(ModelHeader::named(&name), reference::load_database(db, kind)?)
        }
        None => {
            info!("Building {} AK135 reference model", kind);
            VelocityModel::ak135(kind)?
        }
    };

    io::write_model(&model, output)?;
    println!(
        "Reference model written: {} ({} layers)",
        output.display(),
        model.stack.len()
    );

    Ok(())
}

/// Insert a single layer.
pub fn insert(
    path: &Path,
    thickness: f64,
    spec: &LayerSpec,
    top: Option<f64>,
    output: Option<&Path>,
) -> Result<()> {
    info!("Inserting {} km layer into: {}", thickness, path.display());

    let mut model = io::read_model(path)?;
    let case = model
        .stack
        .insert_spec(thickness, spec, Placement::from_top(top))?;
    save(&model, path, output)?;

    println!("Inserted layer ({:?}); model has {} layers", case, model.stack.len());
    Ok(())
}

/// Perturb one parameter over a depth range.
pub fn perturb(
    path: &Path,
    param: Parameter,
    fraction: f64,
    zmin: f64,
    zmax: f64,
    output: Option<&Path>,
) -> Result<()> {
    info!("Perturbing {} in: {}", param, path.display());

    let mut model = io::read_model(path)?;
    let report = model.stack.perturb(param, fraction, zmin, zmax)?;
    if report.scaled_layers == 0 && report.boundary_layers == 0 {
        warn!("Nothing to perturb between {} and {} km", zmin, zmax);
    }
    save(&model, path, output)?;

    println!(
        "Perturbed {}: {} layers scaled, {} boundary layers",
        param, report.scaled_layers, report.boundary_layers
    );
    Ok(())
}

/// Merge thin layers in pairs.
pub fn merge_thin(path: &Path, options: &MergeOptions, output: Option<&Path>) -> Result<()> {
    info!("Merging thin layers in: {}", path.display());

    let mut model = io::read_model(path)?;
    let report = model.stack.merge_thin_layers(options)?;
    save(&model, path, output)?;

    println!(
        "Merged {} pairs, truncated {} layers; model has {} layers",
        report.merged_pairs,
        report.truncated,
        model.stack.len()
    );
    Ok(())
}

/// Print a staircase profile of one parameter.
pub fn profile(path: &Path, param: Parameter, zmin: f64, zmax: f64, json: bool) -> Result<()> {
    let model = io::read_model(path)?;
    let points = model.stack.staircase(param, zmin, zmax)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        for point in &points {
            println!("{:.6}\t{:.6}", point.depth, point.value);
        }
    }
    Ok(())
}

/// Apply a layer table.
pub fn apply_table(path: &Path, table: &Path, output: Option<&Path>) -> Result<()> {
    info!("Applying layer table {} to: {}", table.display(), path.display());

    let rows = io::layer_table::read_layer_table(table)?;
    let mut model = io::read_model(path)?;
    io::apply_layer_table(&mut model.stack, &rows)?;
    save(&model, path, output)?;

    println!("Applied {} layers; model has {} layers", rows.len(), model.stack.len());
    Ok(())
}

/// Save a JSON snapshot.
pub fn snapshot(path: &Path, output: &Path) -> Result<()> {
    let model = io::read_model(path)?;
    let snapshot = ModelSnapshot::capture(&model)?;
    snapshot.save(output)?;

    println!("Snapshot {} saved: {}", snapshot.id, output.display());
    println!("Checksum: {}", snapshot.checksum);
    Ok(())
}

/// Restore a model file from a snapshot.
pub fn restore(snapshot: &Path, output: &Path) -> Result<()> {
    let snapshot = ModelSnapshot::load(snapshot)?;
    let model = snapshot.restore()?;
    io::write_model(&model, output)?;

    println!(
        "Restored '{}' from snapshot {} ({})",
        model.name(),
        snapshot.id,
        snapshot.created_at.to_rfc3339()
    );
    Ok(())
}

/// Validate every `*.mod` file under `dir`, returning the number of failures.
pub fn check(dir: &Path) -> Result<usize> {
    info!("Checking model files under: {}", dir.display());

    let mut checked = 0;
    let mut failed = 0;
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "mod") {
            continue;
        }
        checked += 1;
        match io::read_model(path) {
            Ok(model) => println!(
                "OK    {} ({} layers, {:.3} km)",
                path.display(),
                model.stack.len(),
                model.stack.total_depth()
            ),
            Err(e) => {
                failed += 1;
                warn!("{}: {}", path.display(), e);
                println!("FAIL  {} [{}] {}", path.display(), e.error_code(), e);
            }
        }
    }

    println!("{} model files checked, {} failed", checked, failed);
    Ok(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEPTH_EPSILON;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reference_then_perturb_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ak135.mod");

        write_reference(&path, ModelKind::Isotropic, None).unwrap();
        perturb(&path, Parameter::Vs, 0.1, 10.0, 30.0, None).unwrap();

        let model = io::read_model(&path).unwrap();
        assert_eq!(model.stack.len(), 12);
        assert!((model.stack.total_depth() - 410.0).abs() < DEPTH_EPSILON);
    }

    #[test]
    fn test_insert_to_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ak135.mod");
        let out = dir.path().join("edited.mod");
        write_reference(&path, ModelKind::Isotropic, None).unwrap();

        insert(&path, 5.0, &LayerSpec::new(3.0), Some(10.0), Some(&out)).unwrap();

        assert_eq!(io::read_model(&path).unwrap().stack.len(), 10);
        assert_eq!(io::read_model(&out).unwrap().stack.len(), 12);
    }

    #[test]
    fn test_check_counts_failures() {
        let dir = TempDir::new().unwrap();
        write_reference(&dir.path().join("good.mod"), ModelKind::TransverseIsotropic, None).unwrap();
        fs::write(dir.path().join("bad.mod"), "MODEL.01\nBROKEN\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(check(dir.path()).unwrap(), 1);
    }

    #[test]
    fn test_snapshot_restore() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ak135.mod");
        let snap = dir.path().join("ak135.json");
        let restored = dir.path().join("restored.mod");
        write_reference(&path, ModelKind::TransverseIsotropic, None).unwrap();

        snapshot(&path, &snap).unwrap();
        restore(&snap, &restored).unwrap();

        assert_eq!(
            io::read_model(&restored).unwrap(),
            io::read_model(&path).unwrap()
        );
    }
}

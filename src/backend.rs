//! Geometry I/O backend readiness.
//!
//! The backend is checked once at startup. A PROJ data directory, when given,
//! is handed to GDAL before anything opens a dataset.

use std::path::Path;
use std::sync::Once;

use gdal::DriverManager;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// GDAL driver used to read and write `.gdb` containers.
pub const GDB_DRIVER: &str = "OpenFileGDB";

/// Points GDAL/PROJ at an explicit PROJ data directory (the one holding `proj.db`).
pub fn configure_proj_data(dir: &Path) -> Result<()> {
    if !dir.join("proj.db").exists() {
        return Err(Error::BackendNotReady(format!(
            "no proj.db in PROJ data directory {:?}",
            dir
        )));
    }
    let value = dir.to_string_lossy();
    gdal::config::set_config_option("PROJ_DATA", &value)?;
    gdal::config::set_config_option("PROJ_LIB", &value)?;
    info!("PROJ data directory set to {:?}", dir);
    Ok(())
}

static LINEAR_ONLY: Once = Once::new();

/// Makes OGR hand out curve geometries as their linear approximation.
///
/// Arcs in `CircularString`, `CompoundCurve`, `CurvePolygon`, `MultiCurve` and
/// `MultiSurface` shapes are stroked into line segments when a feature's
/// geometry is read, and declared layer types report the linear type. The
/// switch is process-wide and set once.
pub fn linearize_curves() {
    LINEAR_ONLY.call_once(|| {
        // SAFETY: sets a global OGR flag; no pointers are involved.
        unsafe { gdal_sys::OGRSetNonLinearGeometriesEnabledFlag(0) };
        debug!("Non-linear geometries disabled; curves are read as line segments");
    });
}

/// Fails unless the File Geodatabase driver is registered.
pub fn ensure_ready() -> Result<()> {
    linearize_curves();
    let driver = DriverManager::get_driver_by_name(GDB_DRIVER).map_err(|e| {
        Error::BackendNotReady(format!("GDAL driver {} unavailable: {}", GDB_DRIVER, e))
    })?;
    debug!("Geometry backend ready: {}", driver.long_name());
    Ok(())
}

pub fn is_ready() -> bool {
    ensure_ready().is_ok()
}

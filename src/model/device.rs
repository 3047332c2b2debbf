use candle_core::{Device, DeviceLocation};
use tracing::{debug, warn};

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::info;

use super::reranker::RerankerError;

/// Environment variable read by both candle's CPU kernels and rayon's global pool.
pub const THREADS_ENV: &str = "RAYON_NUM_THREADS";

/// Selects the compute device based on enabled features (falls back to CPU).
pub fn select_device() -> Result<Device, RerankerError> {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    let failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                let msg = e.to_string();
                if cfg!(feature = "cuda") {
                    warn!(error = %msg, "Metal device unavailable, trying CUDA");
                } else {
                    warn!(error = %msg, "Metal device unavailable");
                }
                failures.push(format!("metal failed: {msg}"));
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Using CUDA GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(error = %msg, "CUDA device unavailable");
                failures.push(format!("cuda failed: {msg}"));
            }
        }
    }

    if !cfg!(any(feature = "metal", feature = "cuda")) {
        debug!("No GPU backend compiled, using CPU device");
        return Ok(Device::Cpu);
    }

    let reason = if failures.is_empty() {
        "no GPU device available".to_string()
    } else {
        failures.join("; ")
    };

    warn!(reason = %reason, "Falling back to CPU device");
    Ok(Device::Cpu)
}

/// Short human-readable device name (`cpu`, `cuda:0`, `metal:0`).
pub fn device_label(device: &Device) -> String {
    match device.location() {
        DeviceLocation::Cpu => "cpu".to_string(),
        DeviceLocation::Cuda { gpu_id } => format!("cuda:{gpu_id}"),
        DeviceLocation::Metal { gpu_id } => format!("metal:{gpu_id}"),
    }
}

/// Pins the numeric thread count for the whole process.
///
/// Must run before any thread is spawned: both candle and the tokenizer's rayon
/// pool read the value lazily, and it cannot be changed once they have started.
pub fn configure_threads(threads: usize) {
    // SAFETY: called from `main` before the tokio runtime (or any other thread)
    // exists, so no concurrent reader of the environment can observe the write.
    unsafe { std::env::set_var(THREADS_ENV, threads.to_string()) };
}

/// Thread count candle will use for CPU kernels.
pub fn effective_threads() -> usize {
    candle_core::utils::get_num_threads()
}

use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemma:2b";

pub fn default_temperature() -> f32 {
    0.2
}

pub fn default_top_p() -> f32 {
    0.9
}

pub fn default_repeat_penalty() -> f32 {
    1.1
}

pub fn default_num_ctx() -> u32 {
    1024
}

pub fn default_num_thread() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(4)
}

pub fn default_probe_timeout() -> u64 {
    2
}

pub fn default_request_timeout() -> u64 {
    120
}

pub fn default_stream_timeout() -> u64 {
    60
}

pub fn default_context_turns() -> usize {
    3
}

pub fn default_refusal_marker() -> String {
    "cannot".to_string()
}

pub fn default_idle_seconds() -> u64 {
    180 // 3 minutes
}

pub fn default_type_delay_ms() -> u64 {
    15
}

/// `~/VEO-x/Memory/veo_memory.json`, or relative to the working directory without a home.
pub fn default_memory_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("VEO-x")
        .join("Memory")
        .join("veo_memory.json")
}

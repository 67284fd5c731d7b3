pub mod extraction_error;
pub mod frame_sampler;
pub mod sampling_interval;
pub mod sampling_request;

pub mod extract_frames_use_case;

pub mod constants;
pub mod detected_face;
pub mod face_encoding;
pub mod face_extraction;
pub mod face_landmarks;
pub mod face_location;
pub mod frame;
pub mod model_resolver;
pub mod onnx_session;

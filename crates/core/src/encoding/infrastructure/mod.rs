pub mod face_alignment;
pub mod onnx_sface_encoder;

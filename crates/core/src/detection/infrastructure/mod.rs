pub mod detector_factory;
mod math;
pub mod onnx_blazeface_detector;
pub mod onnx_yolo_detector;

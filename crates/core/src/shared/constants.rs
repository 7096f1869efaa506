pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "face_recognition_sface_2021dec.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/opencv/opencv_zoo/raw/main/models/face_recognition_sface/face_recognition_sface_2021dec.onnx";

/// Length of every face encoding the worker emits.
pub const ENCODING_DIM: usize = 128;

/// Control line answered with [`PONG`].
pub const PING: &str = "ping";
pub const PONG: &str = "pong";

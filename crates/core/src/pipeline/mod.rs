pub mod extract_faces_use_case;

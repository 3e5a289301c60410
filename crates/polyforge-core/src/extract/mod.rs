//! Extraction of files and project layouts from LLM markdown output.

pub mod code_blocks;
pub mod structure;

pub use code_blocks::{
    clean_filename, extract_code_blocks, extract_dependencies, extract_file_references,
    is_valid_filename, CodeBlock,
};
pub use structure::{
    extract_project_structure, is_directory_path, normalize_structure, structure_metadata,
    StructureMetadata,
};

//! Report rendering.

pub mod generator;

pub use generator::{
    generate_app_detail_csv, generate_json_report, generate_service_instance_detail_csv,
    write_report,
};

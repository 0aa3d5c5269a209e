pub mod rapl;

use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Write a 100-row frame with numeric and text columns as `<dir>/<name>`
pub fn create_large_test_csv(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut df = df! (
        "a" => (0..100).collect::<Vec<i32>>(),
        "b" => (0..100).map(|i| format!("text_{}", i)).collect::<Vec<String>>(),
        "c" => (0..100).map(|i| i % 3).collect::<Vec<i32>>(),
        "d" => (0..100).map(|i| ["red", "green", "blue", "gold", "teal"][i % 5]).collect::<Vec<&str>>()
    )
    .unwrap();
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}

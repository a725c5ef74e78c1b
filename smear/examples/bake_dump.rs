use smear::json::{BakeDocument, delta_field_to_json_string};
use std::path::PathBuf;

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut positional = Vec::<String>::new();
    let mut smooth_window: Option<usize> = None;
    let mut full_body = false;
    let mut warp_bias: Option<f32> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--smooth-window" => {
                smooth_window = args.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "--warp" => {
                warp_bias = args.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "--full-body" => {
                full_body = true;
                i += 1;
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    let path = positional
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./bake.json"));

    let json = std::fs::read_to_string(&path).expect("read bake json");
    let mut document = BakeDocument::from_json_str(&json).expect("parse bake json");
    if let Some(n) = smooth_window {
        document.settings.smooth_window = n;
    }
    document.settings.full_body |= full_body;

    let mut field = document.bake().expect("bake deltas");
    if let Some(bias) = warp_bias {
        field = field.warp(bias);
    }

    println!(
        "{}",
        delta_field_to_json_string(&field).expect("serialize deltas")
    );
}

use std::env;
use std::fs;
use std::path::PathBuf;

use client::SubmitBody;
use formats::{GeoJsonDocument, bounds_of_document};
use session::CameraFlight;

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "validate" => cmd_validate(args),
        "inspect" => cmd_inspect(args),
        "submit-body" => cmd_submit_body(args),
        _ => Err(usage()),
    }
}

fn cmd_validate(args: Vec<String>) -> Result<(), String> {
    // mapdrop validate <input.geojson>
    if args.len() != 1 {
        return Err(usage());
    }

    let input = PathBuf::from(&args[0]);
    let bytes = fs::read(&input).map_err(|e| format!("read {input:?}: {e}"))?;
    let doc = GeoJsonDocument::from_reader_text(&bytes).map_err(|e| e.to_string())?;

    eprintln!(
        "ok: {} features (blake3={})",
        doc.feature_count(),
        doc.content_id()
    );
    Ok(())
}

fn cmd_inspect(args: Vec<String>) -> Result<(), String> {
    // mapdrop inspect <input.geojson>
    if args.len() != 1 {
        return Err(usage());
    }

    let input = PathBuf::from(&args[0]);
    let bytes = fs::read(&input).map_err(|e| format!("read {input:?}: {e}"))?;
    let doc = GeoJsonDocument::from_reader_text(&bytes).map_err(|e| e.to_string())?;

    let mut obj = serde_json::Map::new();
    obj.insert(
        "feature_count".to_string(),
        serde_json::Value::Number(serde_json::Number::from(doc.feature_count() as u64)),
    );
    obj.insert(
        "content_id".to_string(),
        serde_json::Value::String(doc.content_id()),
    );

    match bounds_of_document(&doc) {
        Some(bounds) => {
            obj.insert(
                "lon_lat_bounds".to_string(),
                serde_json::json!([
                    bounds.min_lon,
                    bounds.min_lat,
                    bounds.max_lon,
                    bounds.max_lat
                ]),
            );
            let flight = CameraFlight::to_bounds(&bounds);
            obj.insert(
                "camera".to_string(),
                serde_json::json!({
                    "center": [flight.center.lat_deg, flight.center.lng_deg],
                    "zoom": flight.zoom,
                    "duration_s": flight.duration_s,
                    "animate": flight.animate,
                }),
            );
        }
        None => {
            obj.insert("lon_lat_bounds".to_string(), serde_json::Value::Null);
            obj.insert("camera".to_string(), serde_json::Value::Null);
        }
    }

    let v = serde_json::Value::Object(obj);
    println!(
        "{}",
        serde_json::to_string_pretty(&v).map_err(|e| format!("json: {e}"))?
    );
    Ok(())
}

fn cmd_submit_body(args: Vec<String>) -> Result<(), String> {
    // mapdrop submit-body <input.geojson> --name NAME
    if args.is_empty() {
        return Err(usage());
    }

    let input = PathBuf::from(&args[0]);
    let mut name: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--name" => {
                i += 1;
                if i >= args.len() {
                    return Err("--name requires a value".to_string());
                }
                name = Some(args[i].clone());
            }
            other => {
                return Err(format!("unknown arg: {other}\n\n{}", usage()));
            }
        }
        i += 1;
    }

    let name = name.ok_or_else(|| "submit-body requires --name".to_string())?;
    if name.is_empty() {
        return Err("--name must not be empty".to_string());
    }

    let bytes = fs::read(&input).map_err(|e| format!("read {input:?}: {e}"))?;
    let doc = GeoJsonDocument::from_reader_text(&bytes).map_err(|e| e.to_string())?;

    let body = SubmitBody { name, geojson: doc };
    let payload = serde_json::to_string_pretty(&body).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "mapdrop".to_string());
    format!(
        "Usage:\n  {exe} validate <input.geojson>\n  {exe} inspect <input.geojson>\n  {exe} submit-body <input.geojson> --name NAME\n\nNotes:\n- validate exits non-zero unless the file is a GeoJSON FeatureCollection.\n- inspect prints a JSON summary: feature count, content id, bounds and the camera target the viewer would fly to.\n- submit-body prints the POST payload for the /api endpoint; pipe it to curl.\n"
    )
}

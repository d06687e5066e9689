//! Integration tests for the mixmap pipeline
//!
//! WAV fixtures are synthesized with hound so expected keys and structure
//! are known up front.

use mixmap::analysis::key::camelot::camelot_for_label;
use mixmap::analysis::{KeyDetector, TemplateKeyDetector};
use mixmap::config::Settings;
use mixmap::features::{AudioFeatures, ChromaMatrix, MagnitudeSpectrogram};
use mixmap::{pipeline, MixmapError};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const C_MAJOR_TRIAD: [f32; 3] = [261.63, 329.63, 392.0];

/// Write a mono 16-bit WAV whose sample at time `t` is `signal(t)`
fn write_wav(path: &Path, duration_secs: f32, sample_rate: u32, signal: impl Fn(f32) -> f32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");

    let num_samples = (duration_secs * sample_rate as f32) as usize;
    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        let sample = signal(t).clamp(-1.0, 1.0);
        writer
            .write_sample((sample * 32767.0) as i16)
            .expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}

fn chord(freqs: &[f32], amplitude: f32) -> impl Fn(f32) -> f32 + '_ {
    move |t| {
        freqs
            .iter()
            .map(|f| amplitude * (2.0 * PI * f * t).sin())
            .sum()
    }
}

/// Heavy 55 Hz bass under a quiet triad for 30 s, then the triad alone
fn bass_then_quiet(t: f32) -> f32 {
    let pad = chord(&C_MAJOR_TRIAD, 0.02)(t);
    if t < 30.0 {
        0.7 * (2.0 * PI * 55.0 * t).sin() + pad
    } else {
        pad
    }
}

fn test_settings(input: &Path, output: &Path) -> Settings {
    Settings {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        analysis_threads: 2,
        show_progress: false,
        ..Settings::default()
    }
}

fn read_json(output_dir: &Path) -> serde_json::Value {
    let content = fs::read_to_string(output_dir.join("mixmap.json")).expect("Failed to read JSON");
    serde_json::from_str(&content).expect("Invalid JSON")
}

#[test]
fn test_pipeline_writes_json_and_xml() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    // 44.1 kHz exercises the resampler
    write_wav(&input_dir.path().join("triad.wav"), 8.0, 44100, chord(&C_MAJOR_TRIAD, 0.2));

    let result = pipeline::run(&test_settings(input_dir.path(), output_dir.path())).unwrap();
    assert_eq!(result.total_files, 1);
    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 0);

    let json = read_json(output_dir.path());
    let track = &json["tracks"][0];
    let label = track["key"]["label"].as_str().unwrap();
    let code = track["key"]["camelot"].as_str().unwrap();
    assert_eq!(label, "C Major");
    assert_eq!(code, "8B");
    assert_eq!(camelot_for_label(label), code);
    assert_eq!(track["key"]["compatible"].as_array().unwrap().len(), 4);
    let duration = track["structure"]["duration_sec"].as_f64().unwrap();
    assert!((duration - 8.0).abs() < 0.05, "duration {}", duration);
    assert_eq!(track["structure"]["segments"].as_array().unwrap().len(), 2);
    assert_eq!(track["metadata"]["title"], "triad");

    let xml = fs::read_to_string(output_dir.path().join("rekordbox.xml")).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<DJ_PLAYLISTS"));
    assert!(xml.contains(r#"Tonality="8B""#));
    assert!(xml.contains("mixmap_import_"));
}

#[test]
fn test_bass_drop_becomes_mix_point() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_wav(&input_dir.path().join("drop.wav"), 60.0, 22050, bass_then_quiet);

    let result = pipeline::run(&test_settings(input_dir.path(), output_dir.path())).unwrap();
    assert_eq!(result.successful, 1);

    let json = read_json(output_dir.path());
    let structure = &json["tracks"][0]["structure"];

    let mix_points: Vec<f64> = structure["mix_points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert!(
        mix_points.iter().any(|t| (t - 30.0).abs() < 1.0),
        "no mix point near 30s: {:?}",
        mix_points
    );
    for pair in mix_points.windows(2) {
        assert!(pair[1] - pair[0] > 10.0);
    }

    let segments = structure["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 12);
    for segment in segments {
        let time = segment["time"].as_f64().unwrap();
        let label = segment["label"].as_str().unwrap();
        if (5.0..=25.0).contains(&time) {
            assert_eq!(label, "Drop/Chorus (High Energy)", "at {}s", time);
        } else if time >= 35.0 {
            assert_eq!(label, "Intro/Outro (Quiet)", "at {}s", time);
        }
    }

    let xml = fs::read_to_string(output_dir.path().join("rekordbox.xml")).unwrap();
    assert!(xml.contains("<POSITION_MARK"));
    assert!(xml.contains(r#"Num="-1""#));
}

#[test]
fn test_rerun_skips_analyzed_tracks_unless_forced() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_wav(&input_dir.path().join("a.wav"), 4.0, 22050, chord(&C_MAJOR_TRIAD, 0.2));

    let settings = test_settings(input_dir.path(), output_dir.path());
    assert_eq!(pipeline::run(&settings).unwrap().successful, 1);

    let second = pipeline::run(&settings).unwrap();
    assert_eq!(second.successful, 0);
    assert_eq!(second.skipped, 1);

    let forced = Settings {
        force: true,
        ..settings
    };
    assert_eq!(pipeline::run(&forced).unwrap().successful, 1);
    assert_eq!(read_json(output_dir.path())["tracks"].as_array().unwrap().len(), 1);
}

#[test]
fn test_rekordbox_collection_keeps_earlier_tracks() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let settings = test_settings(input_dir.path(), output_dir.path());

    write_wav(&input_dir.path().join("a.wav"), 4.0, 22050, chord(&C_MAJOR_TRIAD, 0.2));
    assert_eq!(pipeline::run(&settings).unwrap().successful, 1);

    write_wav(&input_dir.path().join("b.wav"), 4.0, 22050, chord(&C_MAJOR_TRIAD, 0.2));
    let second = pipeline::run(&settings).unwrap();
    assert_eq!(second.total_files, 2);
    assert_eq!(second.successful, 1);
    assert_eq!(second.skipped, 1);

    let xml = fs::read_to_string(output_dir.path().join("rekordbox.xml")).unwrap();
    assert!(xml.contains("a.wav"), "earlier track missing from collection");
    assert!(xml.contains("b.wav"));
    assert!(xml.contains(r#"Entries="2""#));
    assert_eq!(xml.matches("<TRACK ").count(), 4);

    let json = read_json(output_dir.path());
    assert_eq!(json["tracks"].as_array().unwrap().len(), 2);
}

#[test]
fn test_unusable_files_are_skipped() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_wav(&input_dir.path().join("short.wav"), 1.0, 22050, chord(&C_MAJOR_TRIAD, 0.2));
    write_wav(&input_dir.path().join("silence.wav"), 5.0, 22050, |_| 0.0);
    fs::write(input_dir.path().join("corrupt.wav"), b"RIFF....not a wave file").unwrap();
    write_wav(&input_dir.path().join("good.wav"), 5.0, 22050, chord(&C_MAJOR_TRIAD, 0.2));

    let result = pipeline::run(&test_settings(input_dir.path(), output_dir.path())).unwrap();
    assert_eq!(result.total_files, 4);
    assert_eq!(result.successful, 1);
    assert_eq!(result.skipped, 3);
    assert_eq!(result.failed, 0);

    let json = read_json(output_dir.path());
    let tracks = json["tracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 1);
    assert!(tracks[0]["path"].as_str().unwrap().ends_with("good.wav"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_wav(&input_dir.path().join("a.wav"), 4.0, 22050, chord(&C_MAJOR_TRIAD, 0.2));

    let settings = Settings {
        dry_run: true,
        ..test_settings(input_dir.path(), output_dir.path())
    };
    let result = pipeline::run(&settings).unwrap();
    assert_eq!(result.total_files, 1);
    assert_eq!(result.successful, 0);
    assert!(!output_dir.path().join("rekordbox.xml").exists());
    assert!(!output_dir.path().join("mixmap.json").exists());
}

#[test]
fn test_empty_directory() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();

    let result = pipeline::run(&test_settings(input_dir.path(), output_dir.path())).unwrap();
    assert_eq!(result.total_files, 0);
    assert!(!output_dir.path().join("rekordbox.xml").exists());
}

#[test]
fn test_nonexistent_input() {
    let output_dir = TempDir::new().unwrap();
    let settings = test_settings(Path::new("/nonexistent/music"), output_dir.path());
    let err = pipeline::run(&settings).unwrap_err();
    assert!(matches!(err, MixmapError::FileNotFound(_)));
}

#[test]
fn test_invalid_structure_config_is_rejected() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let mut settings = test_settings(input_dir.path(), output_dir.path());
    settings.analysis.segment_interval_secs = 0.0;

    let err = pipeline::run(&settings).unwrap_err();
    assert!(matches!(err, MixmapError::ConfigError(_)));
}

#[test]
fn test_c_major_chroma_end_to_end() {
    let mut rows = vec![vec![0.0; 20]; 12];
    for pc in [0, 4, 7] {
        rows[pc] = vec![1.0; 20];
    }
    let features = AudioFeatures {
        chroma: ChromaMatrix::from_rows(&rows).unwrap(),
        rms: vec![],
        magnitude: MagnitudeSpectrogram::default(),
        duration: 20.0 * 512.0 / 22050.0,
        hop_length: 512,
        sample_rate: 22050,
    };

    let key = TemplateKeyDetector::new().detect(&features).unwrap();
    assert_eq!(key.label, "C Major");
    assert_eq!(key.camelot, "8B");
}

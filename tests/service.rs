use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use startup_profit::data::loader;
use startup_profit::predict::store;
use startup_profit::{Query, ServiceConfig, ServiceError, Session};

const DATA: &str = "\
R&D Spend,Administration,Marketing Spend,State,Profit
165349.2,136897.8,471784.1,New York,192261.83
162597.7,151377.59,443898.53,California,191792.06
153441.51,101145.55,407934.54,Florida,191050.39
144372.41,118671.85,383199.62,New York,182901.99
142107.34,91391.77,366168.42,Florida,166187.94
";

fn linear(intercept: f64, padding: usize) -> Vec<u8> {
    // padding makes old and new artifacts differ in length
    format!(
        r#"{{"kind":"linear","intercept":{intercept:?},"rd_spend":0.0,"administration":0.0,"marketing_spend":0.0,"states":{{"California":0.0,"Florida":0.0,"New York":0.0}}}}{}"#,
        " ".repeat(padding)
    )
    .into_bytes()
}

#[test]
fn load_export_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("50_Startups.csv");
    fs::write(&src, DATA).unwrap();

    let ds = loader::load_dataset(&src).unwrap();
    assert_eq!(ds.len(), 5);
    assert_eq!(ds.records()[4].administration, 91391.77);

    let out = dir.path().join("export.csv");
    loader::write_csv(&ds, &out).unwrap();
    let again = loader::load_dataset(&out).unwrap();
    assert_eq!(ds, again);
}

#[test]
fn missing_model_guards_prediction_until_upload() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, DATA).unwrap();
    let config = ServiceConfig {
        data_path: data,
        model_path: dir.path().join("model").join("pipe.json"),
        ..ServiceConfig::default()
    };

    let mut session = Session::open(config).unwrap();
    let q = Query::new(150000.0, 120000.0, 400000.0, "Florida");

    let err = session.predict(&q).unwrap_err();
    assert!(matches!(err, ServiceError::ModelUnavailable { .. }));
    assert!(err.needs_upload());

    session.upload_model(&linear(1234.0, 0)).unwrap();
    let eval = session.evaluate(&q).unwrap();
    assert_eq!(eval.prediction, 1234.0);
}

#[test]
fn concurrent_load_sees_complete_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipe.json");
    let old = linear(1.0, 0);
    let new = linear(2.0, 64 * 1024);
    store::replace_model(&old, &path).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let path = path.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let q = Query::new(0.0, 0.0, 0.0, "California");
            let mut loads = 0;
            while !done.load(Ordering::SeqCst) || loads == 0 {
                let model = store::load_model(&path).expect("artifact must always decode");
                let estimate = model.predict(&q).unwrap();
                assert!(estimate == 1.0 || estimate == 2.0, "got {estimate}");
                loads += 1;
            }
            loads
        })
    };

    for i in 0..200 {
        let bytes = if i % 2 == 0 { &new } else { &old };
        store::replace_model(bytes, &path).unwrap();
    }
    done.store(true, Ordering::SeqCst);

    assert!(reader.join().unwrap() > 0);
}

#[test]
fn sessions_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.csv");
    fs::write(&data, DATA).unwrap();
    let config = ServiceConfig {
        data_path: data,
        model_path: dir.path().join("pipe.json"),
        ..ServiceConfig::default()
    };
    store::replace_model(&linear(1.0, 0), &config.model_path).unwrap();

    let mut first = Session::open(config.clone()).unwrap();
    let mut second = Session::open(config).unwrap();
    let q = Query::new(1.0, 1.0, 1.0, "New York");

    assert_eq!(first.predict(&q).unwrap(), 1.0);
    second.upload_model(&linear(5.0, 0)).unwrap();

    // first keeps its cached model until it re-opens or uploads itself
    assert_eq!(first.predict(&q).unwrap(), 1.0);
    assert_eq!(second.predict(&q).unwrap(), 5.0);
}

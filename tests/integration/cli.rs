//! Full command-line runs: argument parsing through the written run file.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::common::{write_file, DENSE_RUN, SPARSE_RUN, TOPICS_JSONL};
use hybridrank::cli::parse_invocation;
use hybridrank::pipeline::{run, RunSummary};
use hybridrank::{ConfigError, Error, FusionError, RetrievalError, RunFormat, Side};

struct Fixture {
    dir: TempDir,
    topics: PathBuf,
    sparse: PathBuf,
    dense: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let topics = write_file(dir.path(), "topics.jsonl", TOPICS_JSONL);
        let sparse = write_file(dir.path(), "sparse.trec", SPARSE_RUN);
        let dense = write_file(dir.path(), "dense.trec", DENSE_RUN);
        Self {
            dir,
            topics,
            sparse,
            dense,
        }
    }

    fn output(&self) -> PathBuf {
        self.dir.path().join("fused.run")
    }

    /// Main-block args, then both retriever blocks.
    fn args(&self, main: &[&str]) -> Vec<String> {
        let mut args = vec![
            "--topics".to_string(),
            path_arg(&self.topics),
            "--output".to_string(),
            path_arg(&self.output()),
        ];
        args.extend(main.iter().map(|s| s.to_string()));
        args.extend([
            "sparse".to_string(),
            "--run".to_string(),
            path_arg(&self.sparse),
            "dense".to_string(),
            "--run".to_string(),
            path_arg(&self.dense),
            "--threads".to_string(),
            "2".to_string(),
        ]);
        args
    }

    fn run(&self, main: &[&str]) -> Result<RunSummary, Error> {
        run(&parse_invocation(self.args(main)).unwrap())
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn end_to_end_trec() {
    let fx = Fixture::new();
    let summary = fx.run(&["--alpha", "1.0", "--hits", "3"]).unwrap();

    assert_eq!(summary.queries, 3);
    assert_eq!(summary.fused, 2);
    assert_eq!(
        summary.failures,
        vec![(
            "q3".to_string(),
            FusionError::EmptyRankedList { side: Side::Sparse }
        )]
    );
    assert!(!summary.is_complete());
    assert_eq!(summary.format, RunFormat::Trec);

    assert_eq!(
        fs::read_to_string(fx.output()).unwrap(),
        "q1 Q0 d1 1 28.000000 hybridrank\n\
         q1 Q0 d2 2 6.000000 hybridrank\n\
         q1 Q0 d4 3 6.000000 hybridrank\n\
         q2 Q0 d9 1 9.500000 hybridrank\n\
         q2 Q0 d8 2 4.000000 hybridrank\n"
    );
}

#[test]
fn end_to_end_msmarco_with_pool() {
    let fx = Fixture::new();
    let summary = fx
        .run(&["--alpha", "1.0", "--hits", "2", "--format", "msmarco", "--threads", "3"])
        .unwrap();
    assert_eq!(summary.fused, 2);
    assert_eq!(
        fs::read_to_string(fx.output()).unwrap(),
        "q1\td1\t1\nq1\td2\t2\nq2\td9\t1\nq2\td8\t2\n"
    );
}

#[test]
fn config_file_supplies_defaults() {
    let fx = Fixture::new();
    let config = write_file(
        fx.dir.path(),
        "run.json",
        r#"{"alpha": 1.0, "hits": 1, "runtag": "from-config"}"#,
    );
    let config = path_arg(&config);
    fx.run(&["--config", &config, "--hits", "2"]).unwrap();

    let text = fs::read_to_string(fx.output()).unwrap();
    // --hits on the command line beats the file
    assert_eq!(text.lines().count(), 4);
    assert!(text.lines().all(|l| l.ends_with(" from-config")));
}

#[test]
fn integer_query_ids() {
    let fx = Fixture::new();
    let topics = write_file(fx.dir.path(), "int.tsv", "10\tten\n9\tnine\n");
    let sparse = write_file(fx.dir.path(), "int-sparse.trec", "10 Q0 a 1 2.0 s\n9 Q0 b 1 1.0 s\n");
    let dense = write_file(fx.dir.path(), "int-dense.trec", "10 Q0 a 1 1.0 d\n9 Q0 b 1 1.0 d\n");

    let args = vec![
        "--topics".to_string(),
        path_arg(&topics),
        "--topic-reader".to_string(),
        "tsv".to_string(),
        "--qid-type".to_string(),
        "int".to_string(),
        "--alpha".to_string(),
        "0".to_string(),
        "--format".to_string(),
        "msmarco".to_string(),
        "--output".to_string(),
        path_arg(&fx.output()),
        "dense".to_string(),
        "--run".to_string(),
        path_arg(&dense),
        "sparse".to_string(),
        "--run".to_string(),
        path_arg(&sparse),
    ];
    let summary = run(&parse_invocation(args).unwrap()).unwrap();
    assert!(summary.is_complete());
    // Numeric order: 9 before 10
    assert_eq!(
        fs::read_to_string(fx.output()).unwrap(),
        "9\tb\t1\n10\ta\t1\n"
    );
}

fn int_run_args(fx: &Fixture, topics: &Path, sparse: &Path, dense: &Path) -> Vec<String> {
    let mut args = vec!["--topics".to_string(), path_arg(topics)];
    args.extend(
        ["--topic-reader", "tsv", "--qid-type", "int", "--format", "msmarco", "--output"]
            .iter()
            .map(|s| s.to_string()),
    );
    args.push(path_arg(&fx.output()));
    args.extend(["sparse".to_string(), "--run".to_string(), path_arg(sparse)]);
    args.extend(["dense".to_string(), "--run".to_string(), path_arg(dense)]);
    args
}

#[test]
fn zero_padded_integer_query_ids_match() {
    let fx = Fixture::new();
    let topics = write_file(fx.dir.path(), "padded.tsv", "007\tbear\n");
    let sparse = write_file(fx.dir.path(), "padded-sparse.trec", "007 Q0 d1 1 2.0 s\n");
    let dense = write_file(fx.dir.path(), "padded-dense.trec", "007 Q0 d1 1 1.0 d\n");

    let args = int_run_args(&fx, &topics, &sparse, &dense);
    let summary = run(&parse_invocation(args).unwrap()).unwrap();
    assert!(summary.is_complete());
    assert_eq!(summary.fused, 1);
    assert_eq!(fs::read_to_string(fx.output()).unwrap(), "7\td1\t1\n");
}

#[test]
fn non_integer_run_id_is_retrieval_error() {
    let fx = Fixture::new();
    let topics = write_file(fx.dir.path(), "int.tsv", "1\tbear\n");
    let sparse = write_file(fx.dir.path(), "int-sparse.trec", "1 Q0 d1 1 2.0 s\n");
    let dense = write_file(fx.dir.path(), "bad-dense.trec", "1 Q0 d1 1 1.0 d\nq2 Q0 d2 1 1.0 d\n");

    let args = int_run_args(&fx, &topics, &sparse, &dense);
    let err = run(&parse_invocation(args).unwrap()).unwrap_err();
    assert!(matches!(
        err,
        Error::Retrieval(RetrievalError::InvalidQueryId { line: 2, .. })
    ));
}

#[test]
fn missing_topics_is_config_error_before_retrieval() {
    let fx = Fixture::new();
    let mut args = fx.args(&[]);
    args[1] = path_arg(&fx.dir.path().join("missing.jsonl"));
    // The run files are never opened
    fs::remove_file(&fx.sparse).unwrap();

    let err = run(&parse_invocation(args).unwrap()).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::TopicsNotFound { .. })));
    assert!(!fx.output().exists());
}

#[test]
fn invalid_alpha_is_config_error() {
    let fx = Fixture::new();
    let err = fx.run(&["--alpha=-1"]).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::InvalidAlpha(_))));
}

#[test]
fn unreadable_topic_field_is_config_error() {
    let fx = Fixture::new();
    let err = fx.run(&["--topic-field", "narrative"]).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::MissingTopicField { .. })));
}

#[test]
fn missing_run_file_is_retrieval_error() {
    let fx = Fixture::new();
    fs::remove_file(&fx.dense).unwrap();
    let err = fx.run(&[]).unwrap_err();
    assert!(matches!(err, Error::Retrieval(_)));
}

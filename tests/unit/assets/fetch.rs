use std::io::{Cursor, Write as _};

use super::*;

fn generous() -> Deadline {
    Deadline::after(Duration::from_secs(30))
}

#[test]
fn read_capped_reads_everything_under_the_cap() {
    let data = vec![7u8; 40_000];
    let out = read_capped(Cursor::new(data.clone()), 40_000, &generous()).unwrap();
    assert_eq!(out, data);
}

#[test]
fn read_capped_rejects_oversized_bodies() {
    let err = read_capped(Cursor::new(vec![0u8; 40_001]), 40_000, &generous()).unwrap_err();
    assert!(matches!(err, FetchError::TooLarge { limit: 40_000 }));
}

#[test]
fn expired_deadline_times_out() {
    let deadline = Deadline::at(Instant::now() - Duration::from_millis(1));
    assert!(deadline.remaining().is_zero());
    let err = read_capped(Cursor::new(vec![1u8; 4]), 1024, &deadline).unwrap_err();
    assert!(matches!(err, FetchError::Timeout));
}

#[test]
fn cancel_wins_over_remaining_time() {
    let token = CancelToken::new();
    let deadline = generous().with_cancel(token.clone());
    assert!(deadline.check().is_ok());

    token.cancel();
    assert!(matches!(deadline.check(), Err(FetchError::Cancelled)));
}

#[test]
fn file_fetcher_reads_local_files() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"hello bytes").unwrap();
    let uri = Url::from_file_path(f.path()).unwrap();

    let bytes = FileFetcher::new(1024).fetch(&uri, &generous()).unwrap();
    assert_eq!(bytes, b"hello bytes");
}

#[test]
fn file_fetcher_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let uri = Url::from_file_path(dir.path().join("nope.png")).unwrap();
    let err = FileFetcher::new(1024).fetch(&uri, &generous()).unwrap_err();
    assert!(matches!(err, FetchError::Io(_)), "{err}");
}

#[test]
fn scheme_fetcher_rejects_unknown_schemes() {
    let fetcher = SchemeFetcher::new(&FetchConfig::default()).unwrap();
    let uri = Url::parse("ftp://example.com/a.png").unwrap();
    let err = fetcher.fetch(&uri, &generous()).unwrap_err();
    assert!(matches!(err, FetchError::UnsupportedScheme(ref s) if s == "ftp"));
}

#[test]
fn http_fetcher_refused_connection_is_an_error() {
    let fetcher = SchemeFetcher::new(&FetchConfig::default()).unwrap();
    let uri = Url::parse("http://127.0.0.1:1/photo.png").unwrap();
    assert!(fetcher.fetch(&uri, &generous()).is_err());
}

#[test]
fn scheme_fetcher_serves_files_only_when_allowed() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"local").unwrap();
    let uri = Url::from_file_path(f.path()).unwrap();

    let default = SchemeFetcher::new(&FetchConfig::default()).unwrap();
    let err = default.fetch(&uri, &generous()).unwrap_err();
    assert!(matches!(err, FetchError::UnsupportedScheme(ref s) if s == "file"), "{err}");

    let cfg = FetchConfig {
        allow_file_urls: true,
        ..FetchConfig::default()
    };
    let allowed = SchemeFetcher::new(&cfg).unwrap();
    assert_eq!(allowed.fetch(&uri, &generous()).unwrap(), b"local");
}

#[test]
fn cancel_interrupts_a_silent_http_server() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let held: Vec<_> = listener.incoming().take(1).collect();
        std::thread::sleep(Duration::from_secs(10));
        drop(held);
    });

    let token = CancelToken::new();
    let deadline = Deadline::after(Duration::from_secs(10)).with_cancel(token.clone());
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        token.cancel();
    });

    let uri = Url::parse(&format!("http://{addr}/photo.png")).unwrap();
    let started = Instant::now();
    let err = HttpFetcher::new(&FetchConfig::default())
        .unwrap()
        .fetch(&uri, &deadline)
        .unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, FetchError::Cancelled), "{err}");
    assert!(started.elapsed() < Duration::from_secs(3), "{:?}", started.elapsed());
}

#[test]
fn deadline_interrupts_a_silent_http_server() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let held: Vec<_> = listener.incoming().take(1).collect();
        std::thread::sleep(Duration::from_secs(10));
        drop(held);
    });

    let uri = Url::parse(&format!("http://{addr}/photo.png")).unwrap();
    let started = Instant::now();
    let err = HttpFetcher::new(&FetchConfig::default())
        .unwrap()
        .fetch(&uri, &Deadline::after(Duration::from_millis(200)))
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout), "{err}");
    assert!(started.elapsed() < Duration::from_secs(3));
}

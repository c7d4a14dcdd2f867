//! Parsing benchmarks.

use bytes::Bytes;
use courier::cookies::Cookie;
use courier::request::Request;
use courier::response::{parse_header_block, Response};
use courier::transport::TransportInfo;
use courier::url::{compose, Query};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const RESPONSE: &str = "HTTP/1.1 100 Continue\r\n\r\n\
    HTTP/1.1 200 OK\r\n\
    Date: Wed, 21 Oct 2015 07:28:00 GMT\r\n\
    Server: bench\r\n\
    Content-Type: application/json; charset=utf-8\r\n\
    Cache-Control: no-cache\r\n\
    Set-Cookie: sid=abc123; Path=/; HttpOnly; Secure\r\n\
    Set-Cookie: lang=en; Domain=example.com; Expires=Wed, 21 Oct 2015 07:28:00 GMT\r\n\
    Set-Cookie: a=1; b=2; c=3; Max-Age=3600; SameSite=Lax\r\n\r\n\
    {\"users\":[{\"id\":1,\"name\":\"ann\"},{\"id\":2,\"name\":\"bob\"}],\"total\":2}";

/// Benchmark header block parsing.
fn bench_header_parsing(c: &mut Criterion) {
    let block = &RESPONSE[..RESPONSE.find("{").unwrap_or(RESPONSE.len())];

    let mut group = c.benchmark_group("header_parsing");

    group.bench_function("header_block", |b| {
        b.iter(|| black_box(parse_header_block(black_box(block))))
    });

    group.finish();
}

/// Benchmark cookie parsing.
fn bench_cookie_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("cookie_parsing");

    for count in [1usize, 10, 100].iter() {
        let headers: Vec<String> = (0..*count)
            .map(|i| format!("c{}=v{}; Domain=example.com; Path=/; Expires=Wed, 21 Oct 2015 07:28:00 GMT; Secure", i, i))
            .collect();

        group.bench_with_input(BenchmarkId::new("set_cookie", count), &headers, |b, headers| {
            b.iter(|| black_box(Cookie::parse_all(headers, Some(0))))
        });
    }

    group.finish();
}

/// Benchmark full response parsing.
fn bench_response_parsing(c: &mut Criterion) {
    let raw = Bytes::from_static(RESPONSE.as_bytes());
    let info = TransportInfo {
        response_code: 200,
        header_size: RESPONSE.find('{').unwrap_or(0),
        content_type: Some("application/json; charset=utf-8".to_string()),
        ..TransportInfo::default()
    };

    let mut request = Request::new();
    request.set_url("http://example.com/users");
    let options = request.build_options();

    let mut group = c.benchmark_group("response_parsing");

    group.bench_function("json_response", |b| {
        b.iter(|| black_box(Response::parse(Ok(raw.clone()), &info, &options)))
    });

    group.finish();
}

/// Benchmark URL composition.
fn bench_url_compose(c: &mut Criterion) {
    let mut query = Query::new();
    query.insert("page".into(), "2".into());
    query.insert("tags".into(), vec!["a", "b", "c"].into());

    let mut group = c.benchmark_group("url_compose");

    group.bench_function("merge_query", |b| {
        b.iter(|| {
            black_box(compose(
                black_box("https://user:pw@example.com:8443/list?page=1&size=10#top"),
                &query,
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_header_parsing,
    bench_cookie_parsing,
    bench_response_parsing,
    bench_url_compose,
);

criterion_main!(benches);

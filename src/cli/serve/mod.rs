//! Redirect server with live mapping updates.
//!
//! Wires the discovery pipeline to the HTTP side: the initial scan and the
//! watcher produce onto the mapping stream, the registry drains it, and the
//! request loop resolves request paths against the registry and the
//! configured prefix redirects.

mod lifecycle;
mod response;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::config::Config;
use crate::core::Mapping;
use crate::redirect::{self, RedirectHandler};
use crate::registry::REGISTRY;
use crate::watch::Watcher;
use crate::{log, scan};

/// Bound server ready to accept requests.
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

/// Validate setup, bind the server, and run until shutdown.
pub fn run_serve(config: Config) -> Result<()> {
    let base = config.base_dir();
    if !base.is_dir() {
        anyhow::bail!("content base {:?} is not a directory", base);
    }

    let bound = bind_server(&config)?;
    bound.run(Arc::new(config))
}

/// Bind the HTTP server without starting the request loop.
pub fn bind_server(config: &Config) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    crate::core::register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);

    Ok(BoundServer { server, addr })
}

impl BoundServer {
    /// Get the bound address.
    #[allow(dead_code)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the discovery pipeline and the request loop (blocking).
    pub fn run(self, config: Arc<Config>) -> Result<()> {
        let base = config.base_dir();
        let redirects = Arc::new(redirect::build_handlers(&config.redirect)?);

        // Mapping stream: scanner + watcher produce, the registry consumes.
        let (mappings_tx, mappings_rx) = channel::unbounded::<Mapping>();

        // Construct the watcher before the initial scan so changes made
        // while scanning are buffered rather than lost.
        let watcher = if config.serve.watch {
            Some(Watcher::new(&base, mappings_tx.clone())?)
        } else {
            None
        };

        std::thread::spawn(move || REGISTRY.drain(mappings_rx));

        std::thread::spawn(move || {
            let emitted = scan::scan_tree(&base, &mappings_tx);
            log!(
                "scan";
                "{} mapping{} under {}",
                emitted,
                if emitted == 1 { "" } else { "s" },
                base.display()
            );
        });

        let watcher_handle = lifecycle::spawn_watcher(watcher);
        run_request_loop(&self.server, &config, &redirects);
        lifecycle::wait_for_shutdown(watcher_handle);
        Ok(())
    }
}

fn run_request_loop(server: &Server, config: &Arc<Config>, redirects: &Arc<Vec<RedirectHandler>>) {
    // Handle requests on a small pool so a slow client cannot stall the
    // accept loop.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let config = Arc::clone(config);
        let redirects = Arc::clone(redirects);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config, &redirects) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request.
fn handle_request(request: Request, config: &Config, redirects: &[RedirectHandler]) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let (raw_path, query) = split_query(request.url());
    let path = decode_path(raw_path);

    // Discovered short links first; they are the reason this server exists
    if let Some(permalink) = REGISTRY.lookup(&path) {
        return response::respond_redirect(request, &permalink, config.serve.redirect_status);
    }

    for handler in redirects {
        if handler.matches(raw_path) {
            return match handler.resolve(raw_path, query) {
                Ok(location) => response::respond_redirect(request, &location, handler.status()),
                Err(e) => {
                    log!("serve"; "redirect error for {}: {}", raw_path, e);
                    response::respond_not_found(request)
                }
            };
        }
    }

    response::respond_not_found(request)
}

/// Split a raw request URL into path and query string.
fn split_query(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

/// Decode percent-encoding; registry keys are decoded paths.
fn decode_path(path: &str) -> String {
    percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    #[test]
    fn test_split_query() {
        assert_eq!(split_query("/x"), ("/x", None));
        assert_eq!(split_query("/x?a=b"), ("/x", Some("a=b")));
        assert_eq!(split_query("/x?a=b?c"), ("/x", Some("a=b?c")));
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/x"), "/x");
        assert_eq!(decode_path("/caf%C3%A9"), "/café");
        assert_eq!(decode_path("/a%20b"), "/a b");
    }

    /// One raw HTTP/1.0 round trip against a real bound server.
    fn roundtrip(request_path: &str, config: &Config, redirects: &[RedirectHandler]) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();

        let redirects = redirects.to_vec();
        let config = config.clone();
        let handle = std::thread::spawn(move || {
            let request = server.recv().unwrap();
            handle_request(request, &config, &redirects).unwrap();
        });

        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "GET {request_path} HTTP/1.0\r\n\r\n").unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).unwrap();
        handle.join().unwrap();
        buf
    }

    #[test]
    fn test_registered_short_path_redirects() {
        REGISTRY.insert(Mapping::new("/serve-test", "https://example.com/st"));

        let reply = roundtrip("/serve-test", &Config::default(), &[]);
        assert!(reply.contains(" 302 "), "unexpected reply: {reply}");
        assert!(reply.contains("Location: https://example.com/st"));
    }

    #[test]
    fn test_unmapped_path_is_not_found() {
        let reply = roundtrip("/never-mapped", &Config::default(), &[]);
        assert!(reply.contains(" 404 "), "unexpected reply: {reply}");
    }

    #[test]
    fn test_prefix_redirect_forwards_suffix() {
        let rules = [crate::config::RedirectRule {
            prefix: "ext".into(),
            destination: "https://example.org/".into(),
            status: None,
        }];
        let redirects = redirect::build_handlers(&rules).unwrap();

        let reply = roundtrip("/ext/a/b?c=d", &Config::default(), &redirects);
        assert!(reply.contains(" 301 "), "unexpected reply: {reply}");
        assert!(reply.contains("Location: https://example.org/a/b?c=d"));
    }
}

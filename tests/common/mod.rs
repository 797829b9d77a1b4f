#![allow(dead_code)]

pub mod test_server {
    use std::sync::Once;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// Send a raw HTTP request and collect whatever arrives before the read timeout.
    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(200)))
            .unwrap();
        let mut buf = Vec::new();
        loop {
            let mut tmp = [0u8; 1024];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    pub fn get(addr: &SocketAddr, path: &str) -> String {
        send_request(
            addr,
            &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"),
        )
    }

    /// Status code, lowercase header pairs and body of a raw response.
    pub fn parse_response(resp: &str) -> (u16, Vec<(String, String)>, String) {
        let (head, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
        let mut status = 0;
        let mut headers = Vec::new();
        for line in head.lines() {
            if line.starts_with("HTTP/1.1") {
                status = line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("0")
                    .parse()
                    .unwrap();
            } else if let Some((name, val)) = line.split_once(':') {
                headers.push((name.trim().to_ascii_lowercase(), val.trim().to_string()));
            }
        }
        (status, headers, body.to_string())
    }

    pub fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Handlers shared by the dispatch, resolution and server tests.
pub mod handlers {
    use anyhow::anyhow;
    use chainroute::context::ResolutionContext;
    use chainroute::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};
    use chainroute::registry::HandlerRegistry;
    use chainroute::resolutions::{Redirect, Text, View};

    pub const NAMESPACE: &str = "app.actions";

    #[derive(Default)]
    pub struct IndexAction;

    impl Handler for IndexAction {
        fn execute(
            &mut self,
            _req: &mut HandlerRequest,
            res: &mut HandlerResponse,
            _ctx: &ResolutionContext,
        ) -> anyhow::Result<Next> {
            res.write_str("index");
            Ok(None)
        }
    }

    /// Served at `/sub1/sub2/someTest`; hands over to a [`Text`].
    #[derive(Default)]
    pub struct SomeTestAction;

    impl Handler for SomeTestAction {
        fn execute(
            &mut self,
            req: &mut HandlerRequest,
            _res: &mut HandlerResponse,
            _ctx: &ResolutionContext,
        ) -> anyhow::Result<Next> {
            let who = req.param("who").unwrap_or("nobody").to_string();
            Ok(Some(Box::new(Text::new(format!("some test for {who}")))))
        }
    }

    #[derive(Default)]
    pub struct SomeRootTestAction;

    impl Handler for SomeRootTestAction {
        fn execute(
            &mut self,
            _req: &mut HandlerRequest,
            res: &mut HandlerResponse,
            _ctx: &ResolutionContext,
        ) -> anyhow::Result<Next> {
            res.write_str("root test");
            Ok(None)
        }
    }

    /// Fails after the first handler in its chain succeeded.
    #[derive(Default)]
    pub struct ExplodeAction;

    struct Detonator;

    impl Handler for ExplodeAction {
        fn execute(
            &mut self,
            _req: &mut HandlerRequest,
            res: &mut HandlerResponse,
            _ctx: &ResolutionContext,
        ) -> anyhow::Result<Next> {
            res.write_str("partial");
            Ok(Some(Box::new(Detonator)))
        }
    }

    impl Handler for Detonator {
        fn execute(
            &mut self,
            _req: &mut HandlerRequest,
            _res: &mut HandlerResponse,
            _ctx: &ResolutionContext,
        ) -> anyhow::Result<Next> {
            Err(anyhow!("boom"))
        }

        fn name(&self) -> &str {
            "Detonator"
        }
    }

    /// `/user/login`: redirects to the index handler with a message.
    #[derive(Default)]
    pub struct LoginAction;

    impl Handler for LoginAction {
        fn execute(
            &mut self,
            _req: &mut HandlerRequest,
            _res: &mut HandlerResponse,
            _ctx: &ResolutionContext,
        ) -> anyhow::Result<Next> {
            Ok(Some(Box::new(
                Redirect::to_handler("app.actions.IndexAction").with_param("msg", "welcome back"),
            )))
        }
    }

    /// `/user/show`: renders `user/show.html` beside itself.
    #[derive(Default)]
    pub struct ShowAction;

    impl Handler for ShowAction {
        fn execute(
            &mut self,
            req: &mut HandlerRequest,
            _res: &mut HandlerResponse,
            _ctx: &ResolutionContext,
        ) -> anyhow::Result<Next> {
            req.repush_single("user");
            req.repush_multiple("tags");
            Ok(Some(Box::new(View::beside(
                "app.actions.user.ShowAction",
                "show.html",
            ))))
        }
    }

    /// `/hello`: renders `hello.html` by explicit path.
    #[derive(Default)]
    pub struct HelloAction;

    impl Handler for HelloAction {
        fn execute(
            &mut self,
            req: &mut HandlerRequest,
            _res: &mut HandlerResponse,
            _ctx: &ResolutionContext,
        ) -> anyhow::Result<Next> {
            req.push("name", req.param("name").unwrap_or("World").to_string());
            Ok(Some(Box::new(View::at("hello.html"))))
        }
    }

    /// `/missingView`: forwards to a template that does not exist.
    #[derive(Default)]
    pub struct MissingViewAction;

    impl Handler for MissingViewAction {
        fn execute(
            &mut self,
            _req: &mut HandlerRequest,
            _res: &mut HandlerResponse,
            _ctx: &ResolutionContext,
        ) -> anyhow::Result<Next> {
            Ok(Some(Box::new(View::at("nope.html"))))
        }
    }

    pub fn registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.register_default::<IndexAction>("app.actions.IndexAction");
        registry.register_default::<SomeTestAction>("app.actions.sub1.sub2.SomeTestAction");
        registry.register_default::<SomeRootTestAction>("app.actions.SomeRootTestAction");
        registry.register_default::<ExplodeAction>("app.actions.ExplodeAction");
        registry.register_default::<LoginAction>("app.actions.user.LoginAction");
        registry.register_default::<ShowAction>("app.actions.user.ShowAction");
        registry.register_default::<HelloAction>("app.actions.HelloAction");
        registry.register_default::<MissingViewAction>("app.actions.MissingViewAction");
        registry.register("app.actions.BrokenAction", || {
            Err(anyhow!("database pool unavailable"))
        });
        registry
    }
}

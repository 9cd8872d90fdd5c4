#![no_main]
use libfuzzer_sys::fuzz_target;

use async_std::io::Cursor;
use gateway_h1::environ::{build_environ, ServerInfo};
use gateway_h1::http11::parse_request;
use gateway_h1::read::read_request;
use gateway_h1::{GatewayMeta, Mode};
use std::io::Read;

fuzz_target!(|data: &[u8]| {
    let mut stream = Cursor::new(data.to_vec());

    async_std::task::block_on(async move {
        let raw = match read_request(&mut stream).await {
            Ok(Some(raw)) => raw,
            _ => return,
        };

        let req = match parse_request(&raw) {
            Ok(req) => req,
            Err(_) => return,
        };

        let info = ServerInfo {
            host: "127.0.0.1".into(),
            port: 8000,
            remote: None,
            meta: GatewayMeta::for_mode(Mode::Sequential),
        };

        if let Ok(mut env) = build_environ(req, &info) {
            let mut body = vec![];
            env.input().read_to_end(&mut body).unwrap();
            assert!(body.len() <= env.content_length());
        }
    });
});

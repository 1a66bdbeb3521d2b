//! Documentation derived from codecs.

#![cfg(feature = "openapi")]

use std::error::Error as StdError;
use std::io::Write;
use std::sync::Arc;

use http::{HeaderMap, StatusCode};
use kok::openapi::{Deriver, DocConfig, OpenApiGenerator, Response, ResponseSchema};
use kok::{
    Codec, CodecRegistry, CommentBlocks, Error, ErrorCode, InterfaceDescription, JsonCodec,
    Method, ResponseWriter, compile, set_content_type,
};
use serde_json::{Value, json};

/// Plain text bodies, JSON failures.
struct TextCodec;

impl Codec for TextCodec {
    fn decode_request_param(&self, _name: &str, value: &str) -> kok::Result<Value> {
        Ok(Value::String(value.to_string()))
    }

    fn decode_request_body(&self, body: &[u8]) -> kok::Result<Value> {
        Ok(Value::String(String::from_utf8_lossy(body).into_owned()))
    }

    fn success_response(&self, body: &Value) -> Value {
        Value::String(body.as_str().unwrap_or_default().to_string())
    }

    fn encode_success_response(
        &self,
        w: &mut dyn ResponseWriter,
        status: StatusCode,
        body: &Value,
    ) -> kok::Result<()> {
        set_content_type(w.headers_mut(), "text/plain");
        w.write_status(status);
        w.write_body(body.as_str().unwrap_or_default().as_bytes());
        Ok(())
    }

    fn encode_failure_response(
        &self,
        w: &mut dyn ResponseWriter,
        err: &(dyn StdError + 'static),
    ) -> kok::Result<()> {
        JsonCodec::new().encode_failure_response(w, err)
    }

    fn encode_request_param(&self, _name: &str, value: &Value) -> String {
        value.as_str().unwrap_or_default().to_string()
    }

    fn encode_request_body(&self, body: &Value) -> kok::Result<(Vec<u8>, HeaderMap)> {
        let mut headers = HeaderMap::new();
        set_content_type(&mut headers, "text/plain");
        Ok((body.as_str().unwrap_or_default().as_bytes().to_vec(), headers))
    }

    fn decode_success_response(&self, body: &[u8]) -> kok::Result<Value> {
        self.decode_request_body(body)
    }

    fn decode_failure_response(&self, body: &[u8]) -> kok::Result<Error> {
        JsonCodec::new().decode_failure_response(body)
    }
}

/// Writes opaque image bytes.
struct AvatarCodec;

impl Codec for AvatarCodec {
    fn decode_request_param(&self, name: &str, value: &str) -> kok::Result<Value> {
        JsonCodec::new().decode_request_param(name, value)
    }

    fn decode_request_body(&self, body: &[u8]) -> kok::Result<Value> {
        Ok(Value::Array(body.iter().map(|b| json!(b)).collect()))
    }

    fn encode_success_response(
        &self,
        w: &mut dyn ResponseWriter,
        status: StatusCode,
        _body: &Value,
    ) -> kok::Result<()> {
        set_content_type(w.headers_mut(), "image/png");
        w.write_status(status);
        w.write_body(&[0x89, b'P', b'N', b'G']);
        Ok(())
    }

    fn encode_failure_response(
        &self,
        w: &mut dyn ResponseWriter,
        err: &(dyn StdError + 'static),
    ) -> kok::Result<()> {
        JsonCodec::new().encode_failure_response(w, err)
    }

    fn encode_request_param(&self, name: &str, value: &Value) -> String {
        JsonCodec::new().encode_request_param(name, value)
    }

    fn encode_request_body(&self, body: &Value) -> kok::Result<(Vec<u8>, HeaderMap)> {
        JsonCodec::new().encode_request_body(body)
    }

    fn decode_success_response(&self, body: &[u8]) -> kok::Result<Value> {
        self.decode_request_body(body)
    }

    fn decode_failure_response(&self, body: &[u8]) -> kok::Result<Error> {
        JsonCodec::new().decode_failure_response(body)
    }
}

fn registry() -> Arc<CodecRegistry> {
    Arc::new(
        CodecRegistry::new()
            .with_codec("GetGreeting", TextCodec)
            .with_codec("GetAvatar", AvatarCodec),
    )
}

fn profile_spec() -> kok::Specification {
    let iface = InterfaceDescription::new("Service")
        .with_method(Method::new("PostProfile").with_param("profile", "Profile"))
        .with_method(Method::new("GetProfile").with_param("id", "String"))
        .with_method(Method::new("GetAvatar").with_param("id", "String"))
        .with_method(Method::new("GetGreeting").with_param("name", "Option<String>"));

    let mut docs = CommentBlocks::new();
    docs.insert(
        "PostProfile".into(),
        vec![
            "// PostProfile adds a profile.".into(),
            r#"// @kok(op): "POST /profiles""#.into(),
            r#"// @kok(success): "statusCode=201""#.into(),
        ],
    );
    docs.insert(
        "GetProfile".into(),
        vec![
            r#"// @kok(op): "GET /profiles/{id}""#.into(),
            r#"// @kok(param): "id,in=path""#.into(),
        ],
    );
    docs.insert(
        "GetAvatar".into(),
        vec![
            r#"// @kok(op): "GET /profiles/{id}/avatar""#.into(),
            r#"// @kok(param): "id,in=path""#.into(),
        ],
    );
    docs.insert(
        "GetGreeting".into(),
        vec![
            r#"// @kok(op): "GET /greeting""#.into(),
            r#"// @kok(param): "name,in=query""#.into(),
        ],
    );
    compile(&iface, &docs).unwrap()
}

#[test]
fn test_custom_codec_content_type_is_observed() {
    let deriver = Deriver::new(registry());
    let spec = profile_spec();
    let op = spec.operation("GetGreeting").unwrap();

    let resp = deriver
        .operation_response(op, &json!("Hello, Alice!"))
        .unwrap();
    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.content_type, "text/plain");
    assert_eq!(resp.body, Some(json!("Hello, Alice!")));
}

#[test]
fn test_media_body_is_none() {
    let deriver = Deriver::new(registry());

    let avatar = deriver
        .success_response("GetAvatar", 200, &Value::Null)
        .unwrap();
    assert_eq!(avatar.content_type, "image/png");
    assert_eq!(avatar.body, None);

    let profile = deriver
        .success_response("GetProfile", 200, &json!({"id": "1"}))
        .unwrap();
    assert_eq!(profile.body, Some(json!({"id": "1"})));
}

#[test]
fn test_success_encoder_reference_selects_codec() {
    let registry = Arc::new(CodecRegistry::new().with_codec("text", TextCodec));
    let iface = InterfaceDescription::new("Service").with_method(Method::new("Hello"));
    let mut docs = CommentBlocks::new();
    docs.insert(
        "Hello".into(),
        vec![
            r#"// @kok(op): "GET /hello""#.into(),
            r#"// @kok(success): "encoder=text""#.into(),
        ],
    );
    let spec = compile(&iface, &docs).unwrap();

    let resp = Deriver::new(registry)
        .operation_response(&spec.operations[0], &json!("hi"))
        .unwrap();
    assert_eq!(resp.content_type, "text/plain");
}

#[test]
fn test_generated_document() {
    let deriver = Deriver::new(registry()).with_failure_errors(|name| match name {
        "PostProfile" => vec![
            Error::new(ErrorCode::InvalidArgument, "invalid profile"),
            Error::new(ErrorCode::AlreadyExists, "profile already exists"),
        ],
        "GetProfile" => vec![Error::new(ErrorCode::NotFound, "profile not found")],
        _ => Vec::new(),
    });
    let config = DocConfig {
        title: "Profile Service".to_string(),
        version: "1.0.0".to_string(),
        ..Default::default()
    };

    let doc = OpenApiGenerator::new(config)
        .with_example("PostProfile", json!({"id": "1"}))
        .with_example("GetProfile", json!({"id": "1", "name": "Alice"}))
        .with_example("GetGreeting", json!("Hello!"))
        .generate(&profile_spec(), &deriver)
        .unwrap();

    assert_eq!(doc["openapi"], "3.0.0");
    assert_eq!(doc["info"]["title"], "Profile Service");

    let post = &doc["paths"]["/profiles"]["post"];
    assert_eq!(post["summary"], "PostProfile adds a profile.");
    assert_eq!(
        post["requestBody"]["content"]["application/json"]["schema"]["properties"]["profile"],
        json!({"type": "object"})
    );
    let responses = post["responses"].as_object().unwrap();
    let mut statuses: Vec<_> = responses.keys().map(String::as_str).collect();
    statuses.sort();
    assert_eq!(statuses, ["201", "400", "409"]);
    assert_eq!(
        post["responses"]["409"]["content"]["application/json; charset=utf-8"]["example"],
        json!({"error": {"code": "ALREADY_EXISTS", "message": "profile already exists"}})
    );

    let get = &doc["paths"]["/profiles/{id}"]["get"];
    assert_eq!(get["parameters"][0]["in"], "path");
    assert_eq!(
        get["responses"]["200"]["content"]["application/json; charset=utf-8"]["schema"],
        json!({
            "type": "object",
            "properties": {"id": {"type": "string"}, "name": {"type": "string"}}
        })
    );
    assert!(get["responses"]["404"].is_object());

    let avatar = &doc["paths"]["/profiles/{id}/avatar"]["get"]["responses"]["200"];
    assert_eq!(
        avatar["content"]["image/png"]["schema"],
        json!({"type": "string", "format": "binary"})
    );

    let greeting = &doc["paths"]["/greeting"]["get"];
    assert_eq!(
        greeting["parameters"][0],
        json!({"name": "name", "in": "query", "required": false, "schema": {"type": "string"}})
    );
    assert_eq!(
        greeting["responses"]["200"]["content"]["text/plain"]["example"],
        "Hello!"
    );
}

#[test]
fn test_custom_failure_enumeration() {
    let deriver = Deriver::new(registry()).with_failures(|name| {
        if name == "GetAvatar" {
            vec![Response::new(404, "text/plain", Some(json!("no avatar")))]
        } else {
            Vec::new()
        }
    });

    assert_eq!(deriver.failure_responses("GetAvatar").len(), 1);
    assert!(deriver.failure_responses("GetProfile").is_empty());
}

#[test]
fn test_config_file_drives_document_info() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
title = "Profile Service"
version = "2.1.0"
description = "Manages user profiles."
servers = ["https://profiles.example.com"]
"#
    )
    .unwrap();

    let config = DocConfig::from_path(file.path()).unwrap();
    let doc = OpenApiGenerator::new(config)
        .generate(&profile_spec(), &Deriver::new(registry()))
        .unwrap();

    assert_eq!(doc["info"]["version"], "2.1.0");
    assert_eq!(doc["info"]["description"], "Manages user profiles.");
    assert_eq!(doc["servers"][0]["url"], "https://profiles.example.com");
    assert_eq!(doc["paths"].as_object().unwrap().len(), 4);
}

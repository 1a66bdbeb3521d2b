//! End-to-end tests for compiling annotated interfaces.

use kok::{
    CommentBlocks, CompileError, InterfaceDescription, Location, MEDIA_TYPE_JSON, Method,
    Specification, compile, reflect_source, reflect_trait,
};

fn docs(entries: &[(&str, &[&str])]) -> CommentBlocks {
    entries
        .iter()
        .map(|(name, lines)| {
            (
                name.to_string(),
                lines.iter().map(|l| l.to_string()).collect(),
            )
        })
        .collect()
}

fn profile_service() -> InterfaceDescription {
    InterfaceDescription::new("Service")
        .with_method(Method::new("PostProfile").with_param("profile", "Profile"))
        .with_method(
            Method::new("PutProfile")
                .with_param("id", "String")
                .with_param("profile", "Profile"),
        )
        .with_method(Method::new("Ping"))
}

#[test]
fn test_op_only_uses_defaults() {
    let spec = compile(
        &profile_service(),
        &docs(&[("PostProfile", &[r#"// @kok(op): "POST /profiles""#])]),
    )
    .unwrap();

    let op = spec.operation("PostProfile").unwrap();
    assert_eq!(op.method, "POST");
    assert_eq!(op.pattern, "/profiles");
    assert_eq!(op.success_response.status_code, 200);
    assert_eq!(op.success_response.media_type, MEDIA_TYPE_JSON);
    assert_eq!(op.success_response.encoder, None);
    assert_eq!(op.options.failure_encoder, None);
    assert_eq!(op.param("profile").unwrap().location, Location::Body);
}

#[test]
fn test_param_moved_to_path() {
    let spec = compile(
        &profile_service(),
        &docs(&[(
            "PutProfile",
            &[
                r#"// @kok(op): "PUT /profiles/{id}""#,
                r#"// @kok(param): "id,in=path""#,
            ],
        )]),
    )
    .unwrap();

    let op = spec.operation("PutProfile").unwrap();
    let id = op.param("id").unwrap();
    assert_eq!(id.location, Location::Path);
    assert!(id.required);
    assert_eq!(op.param("profile").unwrap().location, Location::Body);
    assert_eq!(op.path_vars(), vec!["id"]);
}

#[test]
fn test_unknown_key_names_key_and_method() {
    let err = compile(
        &profile_service(),
        &docs(&[(
            "PostProfile",
            &[
                r#"// @kok(op): "POST /profiles""#,
                r#"// @kok(method): "x""#,
            ],
        )]),
    )
    .unwrap_err();

    match &err {
        CompileError::UnknownKey { method, key, .. } => {
            assert_eq!(method, "PostProfile");
            assert_eq!(key, "method");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("method"));
    assert!(message.contains("PostProfile"));
}

#[test]
fn test_uncommented_methods_are_skipped() {
    let spec = compile(
        &profile_service(),
        &docs(&[("PostProfile", &[r#"// @kok(op): "POST /profiles""#])]),
    )
    .unwrap();

    assert_eq!(spec.len(), 1);
    assert!(spec.operation("PutProfile").is_none());
    assert!(spec.operation("Ping").is_none());
}

#[test]
fn test_no_comments_at_all() {
    let spec = compile(&profile_service(), &CommentBlocks::new()).unwrap();
    assert!(spec.is_empty());
}

#[test]
fn test_operations_follow_declaration_order() {
    let spec = compile(
        &profile_service(),
        &docs(&[
            ("Ping", &[r#"// @kok(op): "GET /ping""#]),
            ("PostProfile", &[r#"// @kok(op): "POST /profiles""#]),
        ]),
    )
    .unwrap();

    let names: Vec<_> = spec.iter().map(|op| op.name.as_str()).collect();
    assert_eq!(names, ["PostProfile", "Ping"]);
}

#[test]
fn test_prose_only_block_is_an_error() {
    let err = compile(
        &profile_service(),
        &docs(&[("Ping", &["// Ping checks liveness."])]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        CompileError::MissingMethod {
            method: "Ping".to_string()
        }
    );
}

#[test]
fn test_one_bad_method_aborts_everything() {
    let err = compile(
        &profile_service(),
        &docs(&[
            ("PostProfile", &[r#"// @kok(op): "POST /profiles""#]),
            ("Ping", &[r#"// @kok(op): "GET""#]),
        ]),
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::MalformedOp { ref value, .. } if value == "GET"));
    assert_eq!(err.method(), Some("Ping"));
}

#[test]
fn test_field_override_leaves_argument_untouched() {
    let iface = InterfaceDescription::new("Service").with_method(
        Method::new("ListProfiles")
            .with_param("filter", "Filter")
            .with_param("token", "String"),
    );
    let spec = compile(
        &iface,
        &docs(&[(
            "ListProfiles",
            &[
                r#"// @kok(op): "GET /profiles""#,
                r#"// @kok(param): "filter.name,in=query""#,
                r#"// @kok(param): "filter.limit,in=query,type=u32""#,
                r#"// @kok(param): "filter.limit,in=header,name=X-Limit""#,
                r#"// @kok(param): "token,in=header,name=Authorization""#,
            ],
        )]),
    )
    .unwrap();

    let op = spec.operation("ListProfiles").unwrap();
    let filter = op.param("filter").unwrap();
    assert_eq!(filter.location, Location::Body);
    assert_eq!(filter.ty, "Filter");
    assert_eq!(filter.wire_name(), "filter");

    // Later override of the same field replaces the earlier one
    let limit = filter.sub_param("limit").unwrap();
    assert_eq!(limit.location, Location::Header);
    assert_eq!(limit.wire_name(), "X-Limit");
    assert_eq!(filter.sub_param("name").unwrap().location, Location::Query);

    let token = op.param("token").unwrap();
    assert_eq!(token.location, Location::Header);
    assert_eq!(token.wire_name(), "Authorization");
    assert_eq!(token.ty, "String");
}

#[test]
fn test_success_and_failure_annotations() {
    let spec = compile(
        &profile_service(),
        &docs(&[(
            "PostProfile",
            &[
                "// PostProfile creates a profile.",
                "//",
                "// The profile ID is generated by the server.",
                r#"// @kok(op): "POST /profiles""#,
                r#"// @kok(success): "statusCode=201,encoder=created""#,
                r#"// @kok(failure): "encoder=problemJSON""#,
            ],
        )]),
    )
    .unwrap();

    let op = spec.operation("PostProfile").unwrap();
    assert_eq!(op.success_response.status_code, 201);
    assert_eq!(op.success_response.encoder.as_deref(), Some("created"));
    assert_eq!(op.options.failure_encoder.as_deref(), Some("problemJSON"));
    assert_eq!(
        op.description.as_deref(),
        Some("PostProfile creates a profile.\n\nThe profile ID is generated by the server.")
    );
}

#[test]
fn test_specification_serializes_for_backends() {
    let spec = compile(
        &profile_service(),
        &docs(&[(
            "PutProfile",
            &[
                r#"// @kok(op): "PUT /profiles/{id}""#,
                r#"// @kok(param): "id,in=path""#,
            ],
        )]),
    )
    .unwrap();

    let value = serde_json::to_value(&spec).unwrap();
    let id = &value["operations"][0]["params"][0];
    assert_eq!(id["name"], "id");
    assert_eq!(id["in"], "path");
    assert_eq!(id["type"], "String");

    let back: Specification = serde_json::from_value(value).unwrap();
    assert_eq!(back, spec);
}

#[test]
fn test_reflect_source_end_to_end() {
    let source = r#"
        pub trait Service {
            /// PostProfile adds a profile.
            /// @kok(op): "POST /profiles"
            fn post_profile(&self, profile: Profile) -> Result<(), Error>;

            /// GetAddress returns one address of a profile.
            /// @kok(op): "GET /profiles/{id}/addresses/{addressID}"
            /// @kok(param): "id,in=path"
            /// @kok(param): "address_id,in=path,name=addressID"
            fn get_address(&self, id: String, address_id: String) -> Result<Address, Error>;

            fn helper(&self) -> u32;
        }
    "#;

    let (iface, docs) = reflect_source(source, "Service").unwrap();
    assert_eq!(iface.methods.len(), 3);

    let spec = compile(&iface, &docs).unwrap();
    assert_eq!(spec.len(), 2);

    let op = spec.operation("get_address").unwrap();
    assert_eq!(op.path_vars(), vec!["id", "addressID"]);
    let address_id = op.param("address_id").unwrap();
    assert_eq!(address_id.location, Location::Path);
    assert_eq!(address_id.wire_name(), "addressID");
    assert_eq!(
        op.description.as_deref(),
        Some("GetAddress returns one address of a profile.")
    );
}

#[test]
fn test_reflect_trait_from_syn() {
    let item: syn::ItemTrait = syn::parse_quote! {
        trait Counter {
            /// @kok(op): "POST /counters/{name}/increment"
            /// @kok(param): "name,in=path"
            /// @kok(param): "by,in=query"
            fn increment(&mut self, name: String, by: Option<u32>);
        }
    };

    let (iface, docs) = reflect_trait(&item).unwrap();
    let spec = compile(&iface, &docs).unwrap();

    let op = spec.operation("increment").unwrap();
    let by = op.param("by").unwrap();
    assert_eq!(by.ty, "Option<u32>");
    assert_eq!(by.location, Location::Query);
    assert!(!by.required);
}

#[test]
fn test_reflect_missing_trait() {
    let err = reflect_source("trait Other {}", "Service").unwrap_err();
    assert!(matches!(err, CompileError::Reflect { .. }));
}

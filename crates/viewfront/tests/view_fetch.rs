//! End-to-end rendering against an on-disk template tree.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use serde_json::{json, Map, Value};
use tempfile::TempDir;
use viewfront::{
    BufferResponder, EngineConfig, HookError, RequestContext, Vars, View, ViewConfig, ViewError,
};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Template tree:
///
/// ```text
/// view/
///   layout.html
///   user/list.html
///   user/edit.html
///   default/user/list.html
///   blue/user/list.html
/// app/admin/view/user/list.html
/// ```
fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "view/layout.html", "[{% block body %}{% endblock %}]");
    write(root, "view/user/list.html", "users: {{ names | join(\", \") }}");
    write(
        root,
        "view/user/edit.html",
        "{% extends \"layout.html\" %}{% block body %}edit {{ id }}{% endblock %}",
    );
    write(root, "view/default/user/list.html", "default theme list");
    write(root, "view/blue/user/list.html", "blue theme list");
    write(root, "app/admin/view/user/list.html", "admin list {{ id }}");
    dir
}

fn view_for(dir: &TempDir) -> View {
    let root = dir.path().display().to_string();
    let config = ViewConfig {
        view_path: format!("{}/view/", root),
        view_depr: "/".into(),
        ..ViewConfig::default()
    };
    let ctx = RequestContext::new()
        .with_module("index")
        .with_controller("user")
        .with_action("list")
        .with_app_path(format!("{}/app/", root));
    View::new(config).with_context(ctx)
}

fn vars(value: Value) -> Vars {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[test]
fn renders_current_action_template() {
    let dir = fixture();
    let mut view = view_for(&dir);
    view.assign("names", json!(["ann", "bob"]));

    assert_eq!(view.render("").unwrap(), "users: ann, bob");
}

#[test]
fn renders_bare_name_in_controller_dir_with_extends() {
    let dir = fixture();
    let mut view = view_for(&dir);

    let output = view
        .fetch("edit", vars(json!({"id": 7})), Map::new())
        .unwrap();
    assert_eq!(output, "[edit 7]");
}

#[test]
fn explicit_vars_replace_assigned_vars() {
    let dir = fixture();
    let mut view = view_for(&dir);
    view.assign("names", json!(["assigned"]));

    let output = view
        .fetch("user/list", vars(json!({"names": ["given"]})), Map::new())
        .unwrap();
    assert_eq!(output, "users: given");
}

#[test]
fn theme_default_and_explicit() {
    let dir = fixture();
    let mut view = view_for(&dir);

    view.theme(true);
    assert_eq!(view.render("list").unwrap(), "default theme list");

    view.theme("blue");
    assert_eq!(view.render("list").unwrap(), "blue theme list");

    view.theme(false);
    view.assign("names", json!([]));
    assert_eq!(view.render("list").unwrap(), "users: ");
}

#[test]
fn repeated_themed_renders_resolve_the_same_file() {
    let dir = fixture();
    let mut view = view_for(&dir);
    view.theme("blue");

    for _ in 0..3 {
        assert_eq!(view.render("list").unwrap(), "blue theme list");
    }
}

#[test]
fn module_qualified_template() {
    let dir = fixture();
    let mut view = view_for(&dir);
    view.assign("id", 3);

    assert_eq!(view.render("admin@user/list").unwrap(), "admin list 3");
}

#[test]
fn existing_file_path_is_rendered_directly() {
    let dir = fixture();
    let mut view = view_for(&dir);
    view.assign("id", 9);

    let direct = dir.path().join("app/admin/view/user/list.html");
    assert_eq!(
        view.render(&direct.to_string_lossy()).unwrap(),
        "admin list 9"
    );
}

#[test]
fn missing_template_fails_without_side_effects() {
    let dir = fixture();
    let responder = BufferResponder::new();
    let hook_ran = Rc::new(Cell::new(false));
    let hook_flag = hook_ran.clone();

    let mut view = view_for(&dir).with_responder(responder.clone());
    view.set_config("emit_response", json!(true)).unwrap();
    view.view_filter(move |c| {
        hook_flag.set(true);
        Ok(c)
    });

    let err = view.render("nope").unwrap_err();
    match &err {
        ViewError::TemplateNotFound { path } => {
            assert!(path.ends_with("user/nope.html"));
        }
        other => panic!("expected TemplateNotFound, got {:?}", other),
    }
    assert_eq!(err.code(), Some(10700));
    assert!(err.to_string().starts_with("template file not exists:"));
    assert!(!hook_ran.get());
    assert!(responder.is_empty());
}

#[test]
fn replacements_applied_after_hooks_and_before_return() {
    let dir = fixture();
    let mut view = view_for(&dir);
    view.set_config("parse_str", json!([["theme list", "THEME LIST"]]))
        .unwrap();
    view.theme(true);
    view.view_filter(|c| Ok(format!("<{}>", c)));

    assert_eq!(view.render("list").unwrap(), "<default THEME LIST>");
}

#[test]
fn hook_failure_aborts_render() {
    let dir = fixture();
    let mut view = view_for(&dir);
    view.assign("names", json!([]));
    view.view_filter(|_| Err(HookError::view_filter("blocked")));

    assert!(matches!(view.render("list"), Err(ViewError::Hook(_))));
}

#[test]
fn responder_receives_final_content() {
    let dir = fixture();
    let responder = BufferResponder::new();
    let mut view = view_for(&dir).with_responder(responder.clone());
    view.configure(&json!({
        "emit_response": true,
        "parse_str": {"ann": "ANN"}
    }))
    .unwrap();
    view.assign("names", json!(["ann"]));

    let output = view.render("").unwrap();
    assert_eq!(output, "users: ANN");
    assert_eq!(
        responder.sent(),
        vec![("users: ANN".to_string(), "text/html".to_string())]
    );
}

#[test]
fn responder_ignored_unless_enabled() {
    let dir = fixture();
    let responder = BufferResponder::new();
    let mut view = view_for(&dir).with_responder(responder.clone());
    view.assign("names", json!([]));

    view.render("").unwrap();
    assert!(responder.is_empty());
}

#[test]
fn native_engine_renders_files() {
    let dir = fixture();
    write(dir.path(), "view/user/card.tpl", "<b>{user.name}</b> {missing}");

    let mut view = view_for(&dir);
    view.configure(&json!({
        "view_suffix": ".tpl",
        "template": {"type": "native"}
    }))
    .unwrap();
    view.assign("user", json!({"name": "Ann"}));

    assert_eq!(view.render("card").unwrap(), "<b>Ann</b> {missing}");
}

#[test]
fn engine_config_from_yaml_file() {
    let dir = fixture();
    let config_path = dir.path().join("view.yaml");
    std::fs::write(
        &config_path,
        format!(
            "view_path: {}/view/\nview_depr: /\ntemplate:\n  type: jinja\n  strict: true\n",
            dir.path().display()
        ),
    )
    .unwrap();

    let config = ViewConfig::from_file(&config_path).unwrap();
    assert_eq!(config.template, EngineConfig::new("jinja").with_option("strict", true));

    let mut view = View::new(config)
        .with_context(RequestContext::new().with_controller("user").with_action("list"));
    // `id` is undefined and the engine is strict.
    assert!(matches!(view.render("edit"), Err(ViewError::Engine(_))));

    view.assign("id", 3);
    assert_eq!(view.render("edit").unwrap(), "[edit 3]");
}

#[test]
fn show_skips_resolution() {
    let dir = fixture();
    let mut view = view_for(&dir);

    // Would be "user/list.html" if resolved; rendered as literal content instead.
    let output = view.show("list", Vars::new()).unwrap();
    assert_eq!(output, "list");
}

#[test]
fn themed_templates_include_from_the_theme_dir() {
    let dir = fixture();
    write(dir.path(), "view/header.html", "ROOT");
    write(dir.path(), "view/blue/header.html", "BLUE");
    write(dir.path(), "view/blue/user/show.html", "{% include \"header.html\" %} show");
    write(dir.path(), "view/user/show.html", "{% include \"header.html\" %} show");
    let mut view = view_for(&dir);

    view.theme("blue");
    assert_eq!(view.render("show").unwrap(), "BLUE show");

    // Switching the theme off rebuilds the engine at the unthemed root.
    view.theme(false);
    assert_eq!(view.render("show").unwrap(), "ROOT show");
}

#[test]
fn map_replacements_through_configure_keep_their_order() {
    let dir = fixture();
    let mut view = view_for(&dir);
    view.configure(&json!({"parse_str": {"b": "c", "a": "b"}}))
        .unwrap();

    // "b" -> "c" runs first, so the "b" produced by "a" -> "b" survives.
    assert_eq!(view.show("a", Vars::new()).unwrap(), "b");
}

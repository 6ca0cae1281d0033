use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use minijinja::Value;
use serde::Serialize;
use serde_json::json;
use tempfile::TempDir;
use trellis_renderer::{RenderContext, RenderError, Renderer};

const TEST_HTML: &str = "\
<a href=\"{{ homelink }}\">home</a>
<form method=\"post\">{{ csrf_token_input }}<input name=\"t\" value=\"{{ csrf_token }}\"></form>
";

/// Stand-in for the web framework's per-request state.
struct FakeRequest {
    csrf: Option<&'static str>,
}

fn csrf_processor(request: &FakeRequest, ctx: &mut RenderContext) {
    if let Some(token) = request.csrf {
        ctx.insert("csrf_token", token);
        ctx.insert(
            "csrf_token_input",
            Value::from_safe_string(format!(
                "<input type=\"hidden\" name=\"csrfmiddlewaretoken\" value=\"{token}\" />"
            )),
        );
    }
}

fn site() -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    let templates = tmp.path().join("templates");
    fs::create_dir_all(&templates).expect("mkdir");
    fs::write(templates.join("test.html"), TEST_HTML).expect("write");
    tmp
}

fn check_scenario(debug: bool) {
    let tmp = site();
    let snapshot: Arc<Mutex<Option<RenderContext>>> = Arc::new(Mutex::new(None));

    let mut renderer = Renderer::new();
    renderer.add_directory(tmp.path().join("templates/"));
    renderer.set_debug(debug);
    renderer.use_context_processor(|_: &FakeRequest, ctx: &mut RenderContext| {
        ctx.insert("csrf_token", "abc");
    });
    let seen = Arc::clone(&snapshot);
    renderer.use_context_processor(move |_: &FakeRequest, ctx: &mut RenderContext| {
        *seen.lock().unwrap() = Some(ctx.clone());
    });

    let out = renderer
        .render_to_string("test.html", &json!({ "homelink": "/" }), &FakeRequest { csrf: None })
        .expect("render");

    let expected: RenderContext = [("homelink", "/"), ("csrf_token", "abc")].into_iter().collect();
    assert_eq!(snapshot.lock().unwrap().as_ref(), Some(&expected));

    let reference = minijinja::Environment::new()
        .render_named_str("test.html", TEST_HTML, &expected)
        .expect("reference render");
    assert_eq!(out, reference);
    assert!(out.contains("home</a>"));
    assert!(out.contains("value=\"abc\""));
}

#[test]
fn scenario_context_and_output_match_engine_rendering() {
    check_scenario(false);
}

#[test]
fn scenario_holds_in_debug_mode() {
    check_scenario(true);
}

#[test]
fn csrf_input_is_not_escaped_but_payload_is() {
    let tmp = site();
    let mut renderer = Renderer::new();
    renderer.add_directory(tmp.path().join("templates"));
    renderer.use_context_processor(csrf_processor);

    let out = renderer
        .render_to_string(
            "test.html",
            &json!({ "homelink": "/?a=<b>" }),
            &FakeRequest { csrf: Some("tok123") },
        )
        .expect("render");

    assert!(
        out.contains("<input type=\"hidden\" name=\"csrfmiddlewaretoken\" value=\"tok123\" />"),
        "safe string must render verbatim, got:\n{out}"
    );
    assert!(out.contains("&lt;b&gt;"), "payload must be escaped, got:\n{out}");
}

#[test]
fn processor_overrides_payload_key() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("x.txt"), "{{ x }}").unwrap();

    let mut renderer = Renderer::new();
    renderer.add_directory(tmp.path());
    renderer.use_context_processor(|_: &(), ctx: &mut RenderContext| {
        ctx.insert("x", "first");
    });
    renderer.use_context_processor(|_: &(), ctx: &mut RenderContext| {
        ctx.insert("x", "second");
    });

    let out = renderer
        .render_to_string("x.txt", &json!({ "x": "payload" }), &())
        .unwrap();
    assert_eq!(out, "second");
}

#[test]
fn struct_payloads_render() {
    #[derive(Serialize)]
    struct Profile<'a> {
        name: &'a str,
        tags: Vec<&'a str>,
    }

    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("p.txt"),
        "{{ name }}:{% for t in tags %}{{ t }}{% if not loop.last %},{% endif %}{% endfor %}",
    )
    .unwrap();
    let mut renderer = Renderer::new();
    renderer.add_directory(tmp.path());

    let out = renderer
        .render_to_string("p.txt", &Profile { name: "ann", tags: vec!["a", "b"] }, &())
        .unwrap();
    assert_eq!(out, "ann:a,b");
}

#[test]
fn plain_string_payload_is_a_format_error() {
    let tmp = site();
    let mut renderer: Renderer<()> = Renderer::new();
    renderer.add_directory(tmp.path().join("templates"));

    let err = renderer
        .render_to_string("test.html", "homelink", &())
        .unwrap_err();
    assert!(matches!(err, RenderError::DataFormat { .. }), "got: {err}");
    assert!(err.to_string().contains("incorrect data format"));
}

#[test]
fn absolute_template_names_bypass_search_directories() {
    let tmp = site();
    let other = TempDir::new().unwrap();
    fs::write(other.path().join("test.html"), "other").unwrap();

    let mut renderer: Renderer<()> = Renderer::new();
    renderer.add_directory(tmp.path().join("templates"));

    let absolute = other.path().join("test.html");
    let out = renderer
        .render_to_string(absolute.to_str().unwrap(), &json!({}), &())
        .unwrap();
    assert_eq!(out, "other");
    assert_eq!(
        renderer.resolve(Path::new(""), absolute.to_str().unwrap()),
        absolute
    );
}

#[test]
fn shared_renderer_serves_concurrent_threads() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("n.txt"), "n={{ n }}").unwrap();
    let mut renderer: Renderer<()> = Renderer::new();
    renderer.add_directory(tmp.path());
    let renderer = Arc::new(renderer);

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let renderer = Arc::clone(&renderer);
            std::thread::spawn(move || {
                renderer
                    .render_to_string("n.txt", &json!({ "n": n }), &())
                    .unwrap()
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("n={n}"));
    }
}

use super::*;

fn provider(kind: ImageProviderKind) -> ImageProviderConfig {
    ImageProviderConfig {
        kind,
        label: kind.as_str().into(),
        api_key: "img-key".into(),
        endpoint: format!("https://{}.test/v1/images/generations", kind.as_str()),
    }
}

#[test]
fn decorate_appends_style() {
    assert_eq!(
        decorate_prompt("  a melting clock "),
        "a melting clock, dark surreal art, dramatic lighting, high contrast, cinematic composition"
    );
}

#[test]
fn together_body_uses_width_height_steps_n() {
    let request = build_request(&provider(ImageProviderKind::Together), "p");
    assert_eq!(request.url, "https://together.test/v1/images/generations");
    assert_eq!(request.bearer, "img-key");
    assert_eq!(request.body["model"], IMAGE_MODEL);
    assert_eq!(request.body["prompt"], "p");
    assert_eq!(request.body["width"], 1024);
    assert_eq!(request.body["height"], 1024);
    assert_eq!(request.body["steps"], 4);
    assert_eq!(request.body["n"], 1);
    assert!(request.body.get("image_size").is_none());
}

#[test]
fn siliconflow_body_uses_image_size_batch_and_enhancement_toggle() {
    let request = build_request(&provider(ImageProviderKind::SiliconFlow), "p");
    assert_eq!(request.body["prompt"], "p");
    assert_eq!(request.body["image_size"], "1024x1024");
    assert_eq!(request.body["batch_size"], 1);
    assert_eq!(request.body["num_inference_steps"], 4);
    assert_eq!(request.body["prompt_enhancement"], false);
    assert!(request.body.get("width").is_none());
}

#[test]
fn together_url_lives_in_data() {
    let root = serde_json::json!({ "data": [{ "url": "https://img.test/a.png" }] });
    assert_eq!(extract_url(ImageProviderKind::Together, &root).as_deref(), Some("https://img.test/a.png"));
    let wrong = serde_json::json!({ "images": [{ "url": "https://img.test/a.png" }] });
    assert!(extract_url(ImageProviderKind::Together, &wrong).is_none());
}

#[test]
fn siliconflow_url_prefers_images_then_data() {
    let images = serde_json::json!({ "images": [{ "url": "https://sf.test/1.png" }], "data": [{ "url": "https://sf.test/2.png" }] });
    assert_eq!(extract_url(ImageProviderKind::SiliconFlow, &images).as_deref(), Some("https://sf.test/1.png"));
    let data = serde_json::json!({ "data": [{ "url": "https://sf.test/2.png" }] });
    assert_eq!(extract_url(ImageProviderKind::SiliconFlow, &data).as_deref(), Some("https://sf.test/2.png"));
}

#[test]
fn empty_or_missing_url_is_none() {
    let empty = serde_json::json!({ "data": [{ "url": "" }] });
    let none = serde_json::json!({ "data": [] });
    assert!(extract_url(ImageProviderKind::Together, &empty).is_none());
    assert!(extract_url(ImageProviderKind::Together, &none).is_none());
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>nutriscan</title>
</head>
<body>
    <h1>nutriscan</h1>
    {{error}}
    <p id="key-status" data-has-token="{{has_token}}">{{status}}</p>
    <form id="analyze" {{hidden}}>
        <input type="file" id="photo" accept="image/*" required>
        <input type="text" id="description" placeholder="Describe the dish (optional)">
        <input type="text" id="portion-size" placeholder="Portion size (optional)">
        <input type="number" id="portion-weight" placeholder="Weight in g (optional)" min="1">
        <button type="submit">Analyze</button>
    </form>
    <pre id="result"></pre>
    <script>
    document.getElementById('analyze').addEventListener('submit', async (ev) => {
        ev.preventDefault();
        const file = document.getElementById('photo').files[0];
        const image = await new Promise((resolve) => {
            const r = new FileReader();
            r.onload = () => resolve(r.result);
            r.readAsDataURL(file);
        });
        const res = await fetch('/analyze', {
            method: 'POST',
            headers: {'Content-Type': 'application/json'},
            body: JSON.stringify({
                image,
                description: document.getElementById('description').value,
                portionSize: document.getElementById('portion-size').value || null,
                portionWeight: document.getElementById('portion-weight').value || null,
            }),
        });
        document.getElementById('result').textContent = JSON.stringify(await res.json(), null, 2);
    });
    </script>
</body>
</html>
"#;

/// Renders the landing page. `error` must be trusted text.
pub fn render_index(has_token: bool, error: Option<&str>) -> String {
    let status = if has_token {
        "API key stored for this session."
    } else {
        "No API key yet. Open this page with ?token=sk-... to add yours."
    };
    let error = error
        .map(|e| format!(r#"<p class="error" role="alert">{e}</p>"#))
        .unwrap_or_default();

    TEMPLATE
        .replace("{{error}}", &error)
        .replace("{{has_token}}", if has_token { "true" } else { "false" })
        .replace("{{status}}", status)
        .replace("{{hidden}}", if has_token { "" } else { "hidden" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_key_state() {
        let page = render_index(true, None);
        assert!(page.contains(r#"data-has-token="true""#));
        assert!(!page.contains("class=\"error\""));

        let page = render_index(false, Some("bad key"));
        assert!(page.contains(r#"data-has-token="false""#));
        assert!(page.contains("bad key"));
        assert!(!page.contains("{{"));
    }
}

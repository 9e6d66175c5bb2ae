use axum::response::Html;

const HOME_HTML: &str = r#"<!DOCTYPE html>
<html>
	<head>
		<meta charset="utf-8">
		<link rel=icon href=data:,>
		<title>DataYoinker</title>
	</head>
	<body>
		<h1>Welcome</h1>
		<p>Welcome to DataYoinker, take a look at
			<a href="/quickstart">the quickstart guide</a>
		for usage information</p>
	</body>
</html>"#;

const QUICKSTART_HTML: &str = r#"<!DOCTYPE html>
<html>
	<head>
		<meta charset="utf-8">
		<link rel=icon href=data:,>
		<title>DataYoinker Quickstart</title>
	</head>
	<body>
		<h1>Publishing data</h1>
		<h2>Publishing your data is as easy as making a GET request!</h2>
		<p>
			The URL is as follows:
			<pre><code>
				http://localhost:3333/publish/yoink/for/mything?variable=value
			</code></pre>
		</p>
		<p>
			An example with curl:
			<pre><code>
				curl 'http://localhost:3333/publish/yoink/for/demoESP32?tempreading=25.7&amp;name=home'
			</code></pre>
			And then you get back something like this:
			<pre><code>
				{
				  "id": 1,
				  "topic": "demoESP32",
				  "timestamp": "2022-10-26T11:21:11Z",
				  "content": {
				    "name": "home",
				    "tempreading": 25.7
				  }
				}
			</code></pre>
		</p>
		<p>
			Prefer POST? Send the same fields as a form:
			<pre><code>
				curl -X POST -d 'tempreading=25.7' -d 'name=home' 'http://localhost:3333/yoink/demoESP32'
			</code></pre>
		</p>
		<h1>Retrieving data</h1>
		<h2>Retrieving your data is also as easy as making a GET request!</h2>
		<p>The URL is as follows:
			<pre><code>
				http://localhost:3333/get/latest/yoink/from/demoESP32
			</code></pre>
		</p>
		<p>
			Need more than one? Ask for the last few, or for everything:
			<pre><code>
				curl 'http://localhost:3333/get/last/5/yoinks/from/demoESP32'
				curl 'http://localhost:3333/get/all/yoinks/from/demoESP32'
			</code></pre>
			Results come newest first.
		</p>
	</body>
</html>"#;

pub(crate) async fn handle_home() -> Html<&'static str> {
    Html(HOME_HTML)
}

pub(crate) async fn handle_quickstart() -> Html<&'static str> {
    Html(QUICKSTART_HTML)
}

/// Plain-text version report of the running build.
pub(crate) async fn handle_info() -> String {
    version_info()
}

fn version_info() -> String {
    format!(
        "Version information about datayoinker:\n\tVersion: {}\n\tRevision: {}\n",
        env!("CARGO_PKG_VERSION"),
        option_env!("DATAYOINKER_REVISION").unwrap_or("unknown"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_names_the_version() {
        let info = version_info();
        assert!(info.starts_with("Version information about datayoinker:\n"));
        assert!(info.contains(&format!("\tVersion: {}\n", env!("CARGO_PKG_VERSION"))));
        assert!(info.contains("\tRevision: "));
    }
}

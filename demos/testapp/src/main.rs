use std::env;

use axum::{
    Router,
    extract::{Multipart, Path},
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    serve,
};
use axum_dropbox::{Dropbox, DropboxContext, DropboxError, RouterExt, views::escape_html};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn page(dropbox: &Dropbox, body: &str) -> Html<String> {
    let nav = if dropbox.is_authenticated() {
        format!(
            "<a href=\"/files\">Files</a> | <a href=\"/upload\">Upload</a> | \
             <a href=\"{}\">Logout</a>",
            escape_html(dropbox.logout_url())
        )
    } else {
        let login = dropbox.context().login_path().unwrap_or("/");
        format!("<a href=\"{}\">Login with Dropbox</a>", escape_html(login))
    };

    Html(format!(
        "<!doctype html>\n<html><body>\n<p>{nav}</p>\n{body}\n</body></html>\n"
    ))
}

async fn home(dropbox: Dropbox) -> Html<String> {
    page(&dropbox, "<h1>axum-dropbox test app</h1>")
}

async fn files(mut dropbox: Dropbox) -> Result<Response, DropboxError> {
    if !dropbox.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let listing = dropbox.client()?.metadata("/", true).await?;
    let info = dropbox.account_info().await?.clone();

    let mut body = format!(
        "<h1>Files of {}</h1>\n<p>{} of {} bytes used</p>\n<ul>\n",
        escape_html(&info.display_name),
        info.quota_info.normal + info.quota_info.shared,
        info.quota_info.quota
    );
    for item in &listing.contents {
        let path = escape_html(item.path.trim_start_matches('/'));
        if item.is_dir {
            body.push_str(&format!("<li>{path}/</li>\n"));
        } else {
            body.push_str(&format!(
                "<li>{path} (<a href=\"/download/{path}\">download</a>, \
                 <a href=\"/media/{path}\">media</a>, <a href=\"/delete/{path}\">delete</a>)</li>\n"
            ));
        }
    }
    body.push_str("</ul>");

    Ok(page(&dropbox, &body).into_response())
}

async fn download(
    mut dropbox: Dropbox,
    Path(filename): Path<String>,
) -> Result<Response, DropboxError> {
    if !dropbox.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let (data, metadata) = dropbox
        .client()?
        .get_file_and_metadata(&format!("/{filename}"))
        .await?;

    let content_type = metadata
        .mime_type
        .unwrap_or_else(|| "application/octet-stream".to_owned());
    Ok(([(CONTENT_TYPE, content_type)], data).into_response())
}

async fn media(
    mut dropbox: Dropbox,
    Path(filename): Path<String>,
) -> Result<Redirect, DropboxError> {
    if !dropbox.is_authenticated() {
        return Ok(Redirect::to("/"));
    }

    let link = dropbox.client()?.media(&format!("/{filename}")).await?;
    Ok(Redirect::to(&link.url))
}

async fn delete(
    mut dropbox: Dropbox,
    Path(filename): Path<String>,
) -> Result<Redirect, DropboxError> {
    if !dropbox.is_authenticated() {
        return Ok(Redirect::to("/"));
    }

    dropbox.client()?.file_delete(&format!("/{filename}")).await?;
    Ok(Redirect::to("/files"))
}

async fn upload_form(dropbox: Dropbox) -> Response {
    if !dropbox.is_authenticated() {
        return Redirect::to("/").into_response();
    }

    page(
        &dropbox,
        "<form method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\">\n<button>Upload</button>\n</form>",
    )
    .into_response()
}

async fn upload(mut dropbox: Dropbox, mut multipart: Multipart) -> Result<Redirect, Response> {
    if !dropbox.is_authenticated() {
        return Ok(Redirect::to("/"));
    }
    let client = dropbox.client().map_err(IntoResponse::into_response)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .replace(['/', '\\'], "_");
        let data = field.bytes().await.map_err(IntoResponse::into_response)?;

        let result = client
            .put_file(&format!("/{filename}"), data, false)
            .await
            .map_err(IntoResponse::into_response)?;

        tracing::info!(path = %result.path, "uploaded file");
        return Ok(Redirect::to(&format!(
            "/success/{}",
            result.path.trim_start_matches('/')
        )));
    }

    Ok(Redirect::to("/upload"))
}

async fn success(dropbox: Dropbox, Path(filename): Path<String>) -> Html<String> {
    page(&dropbox, &format!("<p>{} uploaded.</p>", escape_html(&filename)))
}

fn app(dropbox: DropboxContext) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/files", get(files))
        .route("/download/{*filename}", get(download))
        .route("/media/{*filename}", get(media))
        .route("/delete/{*filename}", get(delete))
        .route("/upload", get(upload_form).post(upload))
        .route("/success/{*filename}", get(success))
        .with_dropbox(&dropbox)
        .with_state(dropbox)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "testapp=debug,axum_dropbox=debug".into()),
        )
        .with_target(false)
        .init();

    let debug = env::var("DEBUG").map(|v| v != "0").unwrap_or(true);

    let mut builder = DropboxContext::builder()
        .config_env()
        .login_path("/login")
        .route("files", "/files")
        .login_redirect("files")
        .use_dev_cookies(debug);
    if let Ok(secret) = env::var("COOKIE_SECRET") {
        builder = builder.cookie_secret(secret);
    }
    let dropbox = builder.try_build()?;

    let addr = env::args().nth(1).unwrap_or_else(|| "0.0.0.0:5000".to_owned());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");

    serve(listener, app(dropbox)).await?;
    Ok(())
}

//! Generate static files

use anyhow::Result;

use crate::generator::{GenerateStats, Generator};
use crate::Blog;

/// Render every page into the public directory
pub async fn run(blog: &Blog) -> Result<GenerateStats> {
    let start = std::time::Instant::now();

    let source = blog.source()?;
    let generator = Generator::new(&blog.config, &blog.i18n()?)?;
    let stats = generator
        .generate(source.as_ref(), &blog.public_dir, &blog.static_dir)
        .await?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FIXTURES: &str = r#"[
        {
            "id": "a",
            "uid": "primeiro-post",
            "type": "post",
            "first_publication_date": "2021-04-19T15:49:00+0000",
            "last_publication_date": "2021-04-19T15:49:00+0000",
            "data": {
                "title": [{ "type": "heading1", "text": "Primeiro post" }],
                "subtitle": "Olá",
                "author": "Joseph Oliveira",
                "content": []
            }
        }
    ]"#;

    #[tokio::test]
    async fn test_generate_from_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("posts.json"), FIXTURES).unwrap();
        fs::write(dir.path().join("_config.yml"), "fixtures: posts.json\n").unwrap();
        fs::create_dir_all(dir.path().join("static")).unwrap();
        fs::write(dir.path().join("static/style.css"), "body {}").unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        let stats = run(&blog).await.unwrap();
        assert_eq!(stats.posts, 1);
        assert_eq!(stats.assets, 1);

        let index = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(index.contains("Primeiro post"));
        assert!(index.contains("19 Abr 2021"));
        assert!(dir.path().join("public/post/primeiro-post/index.html").exists());
        assert!(dir.path().join("public/style.css").exists());
    }
}

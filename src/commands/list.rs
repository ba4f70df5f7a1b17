//! List site content

use anyhow::Result;
use std::str::FromStr;

use crate::content::Post;
use crate::generator::Generator;
use crate::Blog;

/// What `list` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Posts,
    Routes,
}

impl FromStr for ListKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "post" | "posts" => Ok(ListKind::Posts),
            "route" | "routes" => Ok(ListKind::Routes),
            _ => anyhow::bail!("Unknown type: {}. Available: post, route", s),
        }
    }
}

/// List site content by type
pub async fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let kind: ListKind = content_type.parse()?;

    let source = blog.source()?;
    let generator = Generator::new(&blog.config, &blog.i18n()?)?;
    let posts = generator.all_posts(source.as_ref()).await?;

    for line in lines(kind, &posts) {
        println!("{}", line);
    }
    Ok(())
}

fn lines(kind: ListKind, posts: &[Post]) -> Vec<String> {
    let mut out = Vec::with_capacity(posts.len() + 2);
    match kind {
        ListKind::Posts => {
            out.push(format!("Posts ({}):", posts.len()));
            out.extend(posts.iter().map(|post| {
                format!(
                    "  {} - {} by {} [{}]",
                    post.first_publication_date, post.title, post.author, post.slug
                )
            }));
        }
        ListKind::Routes => {
            out.push(format!("Routes ({}):", posts.len() + 1));
            out.push("  /".to_string());
            out.extend(posts.iter().map(|post| format!("  /post/{}", post.slug)));
        }
    }
    out
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
            "data": { "title": "Primeiro post", "author": "Joseph Oliveira" }
        },
        {
            "id": "b",
            "uid": "segundo-post",
            "type": "post",
            "first_publication_date": "2021-04-20T15:49:00+0000",
            "data": { "title": "Segundo post", "author": "Ana Souza" }
        }
    ]"#;

    fn fixture_blog(dir: &std::path::Path) -> Blog {
        fs::write(dir.join("posts.json"), FIXTURES).unwrap();
        fs::write(dir.join("_config.yml"), "fixtures: posts.json\npage_size: 1\n").unwrap();
        Blog::new(dir).unwrap()
    }

    #[test]
    fn test_list_kind() {
        assert_eq!("post".parse::<ListKind>().unwrap(), ListKind::Posts);
        assert_eq!("routes".parse::<ListKind>().unwrap(), ListKind::Routes);
        let err = "tags".parse::<ListKind>().unwrap_err();
        assert!(err.to_string().contains("Unknown type: tags"));
    }

    #[tokio::test]
    async fn test_lists_every_page_of_posts() {
        let dir = tempfile::tempdir().unwrap();
        let blog = fixture_blog(dir.path());
        let source = blog.source().unwrap();
        let generator = Generator::new(&blog.config, &blog.i18n().unwrap()).unwrap();
        let posts = generator.all_posts(source.as_ref()).await.unwrap();

        assert_eq!(
            lines(ListKind::Posts, &posts),
            vec![
                "Posts (2):",
                "  20 Abr 2021 - Segundo post by Ana Souza [segundo-post]",
                "  19 Abr 2021 - Primeiro post by Joseph Oliveira [primeiro-post]",
            ]
        );
        assert_eq!(
            lines(ListKind::Routes, &posts),
            vec![
                "Routes (3):",
                "  /",
                "  /post/segundo-post",
                "  /post/primeiro-post",
            ]
        );
        run(&blog, "post").await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_type_fails_before_fetching() {
        // No fixtures and no endpoint: any fetch would fail with a different error
        let dir = tempfile::tempdir().unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        blog.config.api_endpoint = String::new();

        let err = run(&blog, "tags").await.unwrap_err();
        assert!(err.to_string().contains("Unknown type: tags"));
        assert!(run(&blog, "post").await.is_err());
    }
}

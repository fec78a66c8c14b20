#[cfg(test)]
mod tests {

    mod slug_tests {
        use crate::services::slug::{generate_slug, validate_slug};

        #[test]
        fn test_generate_slug_basic() {
            assert_eq!(generate_slug("Hello World"), "hello-world");
        }

        #[test]
        fn test_generate_slug_special_characters() {
            assert_eq!(generate_slug("Hello, World!"), "hello-world");
        }

        #[test]
        fn test_generate_slug_accents() {
            assert_eq!(generate_slug("Café au lait"), "cafe-au-lait");
        }

        #[test]
        fn test_generate_slug_turkish_lowercase() {
            assert_eq!(generate_slug("ığüşöç"), "igusoc");
        }

        #[test]
        fn test_generate_slug_turkish_uppercase() {
            assert_eq!(generate_slug("İĞÜŞÖÇ"), "igusoc");
        }

        #[test]
        fn test_generate_slug_turkish_title() {
            assert_eq!(
                generate_slug("Boşanma ve Nafaka Davaları!"),
                "bosanma-ve-nafaka-davalari"
            );
        }

        #[test]
        fn test_generate_slug_collapses_whitespace() {
            assert_eq!(
                generate_slug("  Çok   Boşluklu   Başlık  "),
                "cok-bosluklu-baslik"
            );
        }

        #[test]
        fn test_generate_slug_numbers() {
            assert_eq!(generate_slug("Article 123"), "article-123");
        }

        #[test]
        fn test_generate_slug_existing_hyphens() {
            assert_eq!(generate_slug("pre-existing - hyphens"), "pre-existing-hyphens");
        }

        #[test]
        fn test_generate_slug_idempotent() {
            let once = generate_slug("İş Hukuku ve Kıdem Tazminatı");
            assert_eq!(generate_slug(&once), once);
        }

        #[test]
        fn test_generate_slug_empty_input() {
            assert_eq!(generate_slug(""), "");
            assert_eq!(generate_slug("   \t  "), "");
        }

        #[test]
        fn test_generate_slug_only_symbols() {
            assert_eq!(generate_slug("!?&%"), "");
        }

        #[test]
        fn test_generate_slug_shape() {
            for input in [
                "Hukuki Danışmanlık",
                "Ticaret   Hukuku (2024)",
                "Çalışan Hakları & İşe İade",
            ] {
                let slug = generate_slug(input);
                assert!(validate_slug(&slug), "unexpected slug {:?}", slug);
                assert!(!slug.starts_with('-') && !slug.ends_with('-'));
                assert!(!slug.contains("--"));
            }
        }

        #[test]
        fn test_validate_slug_valid() {
            assert!(validate_slug("bosanma-ve-nafaka-davalari"));
            assert!(validate_slug("a"));
            assert!(validate_slug("123"));
        }

        #[test]
        fn test_validate_slug_invalid() {
            assert!(!validate_slug(""));
            assert!(!validate_slug("Hello-World"));
            assert!(!validate_slug("hello world"));
            assert!(!validate_slug("hello_world"));
            assert!(!validate_slug(&"a".repeat(201)));
        }
    }

    mod upload_tests {
        use crate::services::uploads::{
            file_extension, resolve_public_path, validate, AssetKind, UploadError, UploadManager,
        };
        use std::path::PathBuf;

        fn temp_dir() -> PathBuf {
            let dir = std::env::temp_dir().join(format!("counsel_test_{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&dir).expect("Failed to create temp dir");
            dir
        }

        #[test]
        fn test_file_extension() {
            assert_eq!(file_extension("report.PDF"), ".pdf");
            assert_eq!(file_extension("photo.jpeg"), ".jpeg");
            assert_eq!(file_extension("archive.tar.gz"), ".gz");
            assert_eq!(file_extension("noextension"), "");
        }

        #[test]
        fn test_validate_empty_rejected() {
            assert!(matches!(
                validate(AssetKind::Image, "photo.png", 0),
                Err(UploadError::Empty)
            ));
        }

        #[test]
        fn test_validate_oversized_image_rejected() {
            let six_mib = 6 * 1024 * 1024;
            assert!(matches!(
                validate(AssetKind::Image, "photo.png", six_mib),
                Err(UploadError::TooLarge { .. })
            ));
        }

        #[test]
        fn test_validate_oversized_rejected_regardless_of_extension() {
            let eleven_mib = 11 * 1024 * 1024;
            assert!(matches!(
                validate(AssetKind::Document, "contract.pdf", eleven_mib),
                Err(UploadError::TooLarge { .. })
            ));
        }

        #[test]
        fn test_validate_disallowed_extension_case_insensitive() {
            assert!(matches!(
                validate(AssetKind::Document, "setup.EXE", 100),
                Err(UploadError::DisallowedExtension { .. })
            ));
            assert!(matches!(
                validate(AssetKind::Image, "contract.pdf", 100),
                Err(UploadError::DisallowedExtension { .. })
            ));
        }

        #[test]
        fn test_validate_accepts_allowed_types() {
            let two_mib = 2 * 1024 * 1024;
            assert!(validate(AssetKind::Document, "contract.pdf", two_mib).is_ok());
            assert!(validate(AssetKind::Document, "Contract.DOCX", two_mib).is_ok());
            assert!(validate(AssetKind::Image, "photo.WebP", two_mib).is_ok());
        }

        #[test]
        fn test_save_generates_distinct_names() {
            let dir = temp_dir();
            let manager = UploadManager::new();

            let first = manager
                .save(AssetKind::Document, &dir, "brief.pdf", b"first")
                .unwrap();
            let second = manager
                .save(AssetKind::Document, &dir, "brief.pdf", b"second")
                .unwrap();

            assert_ne!(first.file_name, second.file_name);
            assert!(first.file_name.ends_with(".pdf"));
            assert!(first.path.exists());
            assert!(second.path.exists());
            assert_eq!(std::fs::read(&first.path).unwrap(), b"first");

            std::fs::remove_dir_all(&dir).ok();
        }

        #[test]
        fn test_save_creates_missing_directories() {
            let dir = temp_dir().join("nested/deeper");
            let manager = UploadManager::new();

            let stored = manager
                .save(AssetKind::Image, &dir, "photo.png", b"bytes")
                .unwrap();
            assert!(stored.path.exists());

            std::fs::remove_dir_all(dir.parent().unwrap().parent().unwrap()).ok();
        }

        #[test]
        fn test_save_rejects_invalid_without_writing() {
            let dir = temp_dir();
            let manager = UploadManager::new();

            let result = manager.save(AssetKind::Image, &dir, "setup.exe", b"bytes");
            assert!(result.is_err());
            assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

            std::fs::remove_dir_all(&dir).ok();
        }

        #[test]
        fn test_delete_is_idempotent() {
            let dir = temp_dir();
            let manager = UploadManager::new();

            let stored = manager
                .save(AssetKind::Document, &dir, "brief.pdf", b"bytes")
                .unwrap();

            assert!(manager.delete(&stored.path).unwrap());
            assert!(!manager.delete(&stored.path).unwrap());
            assert!(!manager.delete(&dir.join("never-existed.pdf")).unwrap());

            std::fs::remove_dir_all(&dir).ok();
        }

        #[test]
        fn test_resolve_public_path() {
            let root = PathBuf::from("/srv/uploads");
            assert_eq!(
                resolve_public_path(&root, "/uploads/blog/a.jpg"),
                Some(root.join("blog/a.jpg"))
            );
            assert_eq!(
                resolve_public_path(&root, "/uploads/documents/b.pdf"),
                Some(root.join("documents/b.pdf"))
            );
            assert!(resolve_public_path(&root, "/uploads/../etc/passwd").is_none());
            assert!(resolve_public_path(&root, "/uploads/blog/../../x").is_none());
            assert!(resolve_public_path(&root, "/elsewhere/a.jpg").is_none());
            assert!(resolve_public_path(&root, "/uploads/").is_none());
        }
    }

    mod document_tests {
        use crate::services::documents::content_type_for;

        #[test]
        fn test_content_type_known_extensions() {
            assert_eq!(content_type_for(".pdf"), "application/pdf");
            assert_eq!(content_type_for(".doc"), "application/msword");
            assert_eq!(
                content_type_for(".docx"),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            );
            assert_eq!(content_type_for(".xls"), "application/vnd.ms-excel");
            assert_eq!(content_type_for(".zip"), "application/zip");
            assert_eq!(content_type_for(".rar"), "application/x-rar-compressed");
            assert_eq!(content_type_for(".txt"), "text/plain");
        }

        #[test]
        fn test_content_type_case_insensitive() {
            assert_eq!(content_type_for(".PDF"), "application/pdf");
        }

        #[test]
        fn test_content_type_default() {
            assert_eq!(content_type_for(".odd"), "application/octet-stream");
            assert_eq!(content_type_for(""), "application/octet-stream");
        }
    }

    mod markdown_tests {
        use crate::services::markdown::MarkdownRenderer;

        #[test]
        fn test_render_basic_markdown() {
            let renderer = MarkdownRenderer::new();
            let html = renderer.render("# Hello World");
            assert!(html.contains("<h1>"));
            assert!(html.contains("Hello World"));
        }

        #[test]
        fn test_render_strips_scripts() {
            let renderer = MarkdownRenderer::new();
            let html = renderer.render("hello <script>alert(1)</script>");
            assert!(!html.contains("<script>"));
            assert!(html.contains("hello"));
        }
    }

    mod config_tests {
        use crate::Config;

        fn minimal_config() -> &'static str {
            r#"
            [site]
            title = "Test Office"
            description = "Testing"
            url = "http://localhost:3000"

            [server]

            [database]
            path = "./data/test.db"

            [uploads]
            dir = "./data/uploads"
            "#
        }

        #[test]
        fn test_config_defaults() {
            let config: Config = toml::from_str(minimal_config()).unwrap();
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.content.posts_per_page, 10);
            assert_eq!(config.content.recent_posts, 3);
            assert_eq!(config.auth.session_days, 7);
            assert_eq!(config.mail.smtp_port, 587);
            assert!(config.mail.smtp_host.is_empty());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_config_rejects_zero_page_size() {
            let mut raw = minimal_config().to_string();
            raw.push_str("\n[content]\nposts_per_page = 0\n");
            let config: Config = toml::from_str(&raw).unwrap();
            assert!(config.validate().is_err());
        }
    }
}

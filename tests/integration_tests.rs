use counsel_cms::models::{CategoryInput, ContactForm, CreatePost, DocumentUpload, UpdatePost};
use counsel_cms::services::uploads::{AssetKind, UploadManager};
use counsel_cms::services::{auth, categories, documents, messages, posts, settings};
use counsel_cms::Database;
use std::path::PathBuf;

fn create_test_db() -> Database {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let id: u32 = rng.gen();
    let name = format!("test_db_{}", id);

    let db = Database::open_memory(&name).expect("Failed to create test database");
    db.migrate().expect("Failed to run migrations");
    db
}

fn temp_upload_root() -> PathBuf {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let id: u32 = rng.gen();
    let dir = std::env::temp_dir().join(format!("counsel_uploads_{}", id));
    std::fs::create_dir_all(&dir).expect("Failed to create temp upload root");
    dir
}

fn sample_post(title: &str, published: bool) -> CreatePost {
    CreatePost {
        title: title.to_string(),
        summary: Some("A short summary".to_string()),
        body_markdown: "# Heading\n\nBody text.".to_string(),
        category_id: None,
        featured_image: None,
        is_published: published,
        meta_title: None,
        meta_description: None,
        meta_keywords: None,
    }
}

const TEST_PASSWORD: &str = "Password123";
const WRONG_PASSWORD: &str = "WrongPass456";

mod auth_integration_tests {
    use super::*;

    #[test]
    fn test_create_and_authenticate_user() {
        let db = create_test_db();

        let user_id = auth::create_user(&db, "office@example.com", "Jane Counsel", TEST_PASSWORD)
            .expect("Failed to create user");
        assert!(user_id > 0);

        let user = auth::authenticate(&db, "office@example.com", TEST_PASSWORD)
            .expect("Authentication error")
            .expect("User should be found");

        assert_eq!(user.email, "office@example.com");
        assert_eq!(user.full_name, "Jane Counsel");
        assert!(user.is_active);
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let db = create_test_db();
        auth::create_user(&db, "office@example.com", "Jane Counsel", TEST_PASSWORD).unwrap();

        let result =
            auth::authenticate(&db, "office@example.com", WRONG_PASSWORD).expect("Auth error");
        assert!(result.is_none());
    }

    #[test]
    fn test_authenticate_inactive_user() {
        let db = create_test_db();
        auth::create_user(&db, "office@example.com", "Jane Counsel", TEST_PASSWORD).unwrap();

        let conn = db.get().unwrap();
        conn.execute("UPDATE users SET is_active = 0", []).unwrap();

        let result =
            auth::authenticate(&db, "office@example.com", TEST_PASSWORD).expect("Auth error");
        assert!(result.is_none());
    }

    #[test]
    fn test_session_round_trip() {
        let db = create_test_db();
        let user_id =
            auth::create_user(&db, "office@example.com", "Jane Counsel", TEST_PASSWORD).unwrap();

        let token = auth::create_session(&db, user_id, 7).unwrap();
        let user = auth::validate_session(&db, &token)
            .unwrap()
            .expect("Session should resolve");
        assert_eq!(user.id, user_id);

        auth::delete_session(&db, &token).unwrap();
        assert!(auth::validate_session(&db, &token).unwrap().is_none());
    }

    #[test]
    fn test_has_users() {
        let db = create_test_db();
        assert!(!auth::has_users(&db).unwrap());
        auth::create_user(&db, "office@example.com", "Jane Counsel", TEST_PASSWORD).unwrap();
        assert!(auth::has_users(&db).unwrap());
    }

    #[test]
    fn test_weak_passwords_rejected() {
        let db = create_test_db();
        for weak in ["short1A", "alllowercase1", "ALLUPPERCASE1", "NoNumbers"] {
            assert!(
                auth::create_user(&db, "office@example.com", "Jane Counsel", weak).is_err(),
                "password {:?} should be rejected",
                weak
            );
        }
    }
}

mod category_integration_tests {
    use super::*;

    fn input(name: &str, order: i64) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            description: None,
            display_order: order,
            is_active: true,
        }
    }

    #[test]
    fn test_create_category_derives_slug() {
        let db = create_test_db();
        let id = categories::create_category(&db, input("Aile Hukuku", 1)).unwrap();

        let category = categories::get_category(&db, id).unwrap().unwrap();
        assert_eq!(category.slug, "aile-hukuku");
    }

    #[test]
    fn test_duplicate_category_slug_fails() {
        let db = create_test_db();
        categories::create_category(&db, input("İş Hukuku", 1)).unwrap();

        // "Is Hukuku" normalizes to the same slug; the unique constraint
        // rejects it rather than suffixing.
        let result = categories::create_category(&db, input("Is Hukuku", 2));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_active_respects_display_order() {
        let db = create_test_db();
        categories::create_category(&db, input("Second", 2)).unwrap();
        categories::create_category(&db, input("First", 1)).unwrap();
        let inactive_id = categories::create_category(&db, input("Hidden", 0)).unwrap();
        categories::update_category(
            &db,
            inactive_id,
            CategoryInput {
                name: "Hidden".to_string(),
                description: None,
                display_order: 0,
                is_active: false,
            },
        )
        .unwrap();

        let active = categories::list_active(&db).unwrap();
        let names: Vec<_> = active.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(categories::count_active(&db).unwrap(), 2);
    }

    #[test]
    fn test_delete_category_detaches_posts() {
        let db = create_test_db();
        let category_id = categories::create_category(&db, input("Ticaret Hukuku", 1)).unwrap();

        let mut post = sample_post("Some commercial matter", true);
        post.category_id = Some(category_id);
        let post_id = posts::create_post(&db, post).unwrap();

        categories::delete_category(&db, category_id).unwrap();

        let post = posts::get_post_by_id(&db, post_id).unwrap().unwrap();
        assert_eq!(post.post.category_id, None);
    }
}

mod post_integration_tests {
    use super::*;

    #[test]
    fn test_create_post_derives_slug_and_metadata() {
        let db = create_test_db();
        let id = posts::create_post(&db, sample_post("Boşanma ve Nafaka Davaları!", true)).unwrap();

        let post = posts::get_post_by_id(&db, id).unwrap().unwrap().post;
        assert_eq!(post.slug, "bosanma-ve-nafaka-davalari");
        assert!(post.is_published);
        assert!(post.published_at.is_some());
        // Meta fields fall back to title and summary.
        assert_eq!(post.meta_title.as_deref(), Some("Boşanma ve Nafaka Davaları!"));
        assert_eq!(post.meta_description.as_deref(), Some("A short summary"));
        assert!(post.body_html.contains("<h1>"));
    }

    #[test]
    fn test_draft_post_has_no_publish_timestamp() {
        let db = create_test_db();
        let id = posts::create_post(&db, sample_post("Draft title", false)).unwrap();

        let post = posts::get_post_by_id(&db, id).unwrap().unwrap().post;
        assert!(!post.is_published);
        assert!(post.published_at.is_none());
    }

    #[test]
    fn test_duplicate_title_slug_fails() {
        let db = create_test_db();
        posts::create_post(&db, sample_post("Çok Önemli Karar", true)).unwrap();

        let result = posts::create_post(&db, sample_post("Cok Onemli Karar", false));
        assert!(result.is_err(), "colliding slug must surface as an error");
    }

    #[test]
    fn test_empty_title_rejected() {
        let db = create_test_db();
        assert!(posts::create_post(&db, sample_post("!!!", true)).is_err());
        assert!(posts::create_post(&db, sample_post("   ", true)).is_err());
    }

    #[test]
    fn test_update_post_publish_cycle() {
        let db = create_test_db();
        let id = posts::create_post(&db, sample_post("Cycle", false)).unwrap();

        let update = |published| UpdatePost {
            title: "Cycle".to_string(),
            summary: None,
            body_markdown: "Body".to_string(),
            category_id: None,
            featured_image: None,
            is_published: published,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
        };

        posts::update_post(&db, id, update(true)).unwrap();
        let published = posts::get_post_by_id(&db, id).unwrap().unwrap().post;
        let first_stamp = published.published_at.clone();
        assert!(first_stamp.is_some());

        // Staying published keeps the original timestamp.
        posts::update_post(&db, id, update(true)).unwrap();
        let still = posts::get_post_by_id(&db, id).unwrap().unwrap().post;
        assert_eq!(still.published_at, first_stamp);
        assert!(still.updated_at.is_some());

        // Unpublishing clears it.
        posts::update_post(&db, id, update(false)).unwrap();
        let draft = posts::get_post_by_id(&db, id).unwrap().unwrap().post;
        assert!(draft.published_at.is_none());
    }

    #[test]
    fn test_view_counter() {
        let db = create_test_db();
        let id = posts::create_post(&db, sample_post("Viewed", true)).unwrap();

        posts::increment_view_count(&db, id).unwrap();
        posts::increment_view_count(&db, id).unwrap();

        let post = posts::get_post_by_id(&db, id).unwrap().unwrap().post;
        assert_eq!(post.view_count, 2);
        assert_eq!(posts::total_views(&db).unwrap(), 2);
    }

    #[test]
    fn test_list_published_filters_drafts_and_categories() {
        let db = create_test_db();
        let category_id = categories::create_category(
            &db,
            CategoryInput {
                name: "Ceza Hukuku".to_string(),
                description: None,
                display_order: 1,
                is_active: true,
            },
        )
        .unwrap();

        let mut categorized = sample_post("In category", true);
        categorized.category_id = Some(category_id);
        posts::create_post(&db, categorized).unwrap();
        posts::create_post(&db, sample_post("Uncategorized", true)).unwrap();
        posts::create_post(&db, sample_post("Hidden draft", false)).unwrap();

        assert_eq!(posts::list_published(&db, None, 50, 0).unwrap().len(), 2);
        assert_eq!(posts::count_published(&db, None).unwrap(), 2);

        let filtered = posts::list_published(&db, Some(category_id), 50, 0).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].post.title, "In category");
        assert_eq!(filtered[0].category_name.as_deref(), Some("Ceza Hukuku"));
    }

    #[test]
    fn test_related_posts_same_category_only() {
        let db = create_test_db();
        let category_id = categories::create_category(
            &db,
            CategoryInput {
                name: "Aile Hukuku".to_string(),
                description: None,
                display_order: 1,
                is_active: true,
            },
        )
        .unwrap();

        let mut first = sample_post("First in category", true);
        first.category_id = Some(category_id);
        let first_id = posts::create_post(&db, first).unwrap();

        let mut second = sample_post("Second in category", true);
        second.category_id = Some(category_id);
        posts::create_post(&db, second).unwrap();

        posts::create_post(&db, sample_post("Elsewhere", true)).unwrap();

        let related = posts::related_posts(&db, Some(category_id), first_id, 3).unwrap();
        let titles: Vec<_> = related.iter().map(|p| p.post.title.as_str()).collect();
        assert_eq!(titles, vec!["Second in category"]);
    }

    #[test]
    fn test_replace_featured_image_supersedes_old_file() {
        use counsel_cms::services::uploads;

        let db = create_test_db();
        let root = temp_upload_root();
        let manager = UploadManager::new();

        let old = manager
            .save(AssetKind::Image, &root.join("blog"), "old.jpg", b"old")
            .unwrap();
        let old_path = format!("/uploads/blog/{}", old.file_name);

        let mut input = sample_post("Replaceable", true);
        input.featured_image = Some(old_path.clone());
        let post_id = posts::create_post(&db, input).unwrap();

        // The old physical file goes first, then the new one is recorded.
        uploads::delete_public_file(&manager, &root, &old_path);
        let new = manager
            .save(AssetKind::Image, &root.join("blog"), "new.png", b"new")
            .unwrap();
        let new_path = format!("/uploads/blog/{}", new.file_name);
        posts::update_post(
            &db,
            post_id,
            UpdatePost {
                title: "Replaceable".to_string(),
                summary: None,
                body_markdown: "Body".to_string(),
                category_id: None,
                featured_image: Some(new_path.clone()),
                is_published: true,
                meta_title: None,
                meta_description: None,
                meta_keywords: None,
            },
        )
        .unwrap();

        assert!(!old.path.exists());
        assert!(new.path.exists());
        let post = posts::get_post_by_id(&db, post_id).unwrap().unwrap().post;
        assert_eq!(post.featured_image.as_deref(), Some(new_path.as_str()));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_delete_post_removes_physical_files() {
        let db = create_test_db();
        let root = temp_upload_root();
        let manager = UploadManager::new();

        // Featured image stored the way the create handler stores it.
        let image = manager
            .save(AssetKind::Image, &root.join("blog"), "cover.jpg", b"img")
            .unwrap();
        let mut input = sample_post("With assets", true);
        input.featured_image = Some(format!("/uploads/blog/{}", image.file_name));
        let post_id = posts::create_post(&db, input).unwrap();

        let uploads = [
            DocumentUpload {
                original_name: "petition.pdf".to_string(),
                display_name: None,
                description: None,
                data: b"pdf bytes".to_vec(),
            },
            DocumentUpload {
                original_name: "schedule.xlsx".to_string(),
                display_name: Some("Hearing schedule".to_string()),
                description: None,
                data: b"xlsx bytes".to_vec(),
            },
        ];
        let results =
            documents::attach_many(&db, &manager, &root.join("documents"), post_id, &uploads);
        assert!(results.iter().all(|r| r.is_ok()));

        let stored_paths: Vec<PathBuf> = documents::list_for_post(&db, post_id)
            .unwrap()
            .iter()
            .map(|d| root.join(d.file_path.trim_start_matches("/uploads/")))
            .collect();
        assert_eq!(stored_paths.len(), 2);
        assert!(stored_paths.iter().all(|p| p.exists()));
        assert!(image.path.exists());

        posts::delete_post(&db, &manager, &root, post_id).unwrap();

        assert!(posts::get_post_by_id(&db, post_id).unwrap().is_none());
        assert!(documents::list_for_post(&db, post_id).unwrap().is_empty());
        assert!(!image.path.exists());
        assert!(stored_paths.iter().all(|p| !p.exists()));

        std::fs::remove_dir_all(&root).ok();
    }
}

mod document_integration_tests {
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> DocumentUpload {
        DocumentUpload {
            original_name: name.to_string(),
            display_name: None,
            description: None,
            data: bytes.to_vec(),
        }
    }

    #[test]
    fn test_attach_records_metadata() {
        let db = create_test_db();
        let root = temp_upload_root();
        let manager = UploadManager::new();
        let post_id = posts::create_post(&db, sample_post("Host post", true)).unwrap();

        let mut candidate = upload("Petition FINAL.PDF", b"pdf bytes");
        candidate.description = Some("Filed petition".to_string());
        let document = documents::attach(
            &db,
            &manager,
            &root.join("documents"),
            post_id,
            &candidate,
        )
        .unwrap();

        // Stored name is opaque; the client name survives as display only.
        assert_ne!(document.file_name, "Petition FINAL.PDF");
        assert!(document.file_name.ends_with(".pdf"));
        assert_eq!(document.display_name.as_deref(), Some("Petition FINAL.PDF"));
        assert_eq!(document.file_type, ".pdf");
        assert_eq!(document.file_size, b"pdf bytes".len() as i64);
        assert_eq!(document.download_count, 0);
        assert_eq!(
            document.file_path,
            format!("/uploads/documents/{}", document.file_name)
        );

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_attach_many_isolates_failures() {
        let db = create_test_db();
        let root = temp_upload_root();
        let manager = UploadManager::new();
        let post_id = posts::create_post(&db, sample_post("Host post", true)).unwrap();

        let batch = [
            upload("first.pdf", b"one"),
            upload("malware.exe", b"nope"),
            upload("second.docx", b"two"),
        ];
        let results =
            documents::attach_many(&db, &manager, &root.join("documents"), post_id, &batch);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());

        // The failure in the middle must not undo its neighbours.
        let stored = documents::list_for_post(&db, post_id).unwrap();
        assert_eq!(stored.len(), 2);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_download_counter_increments() {
        let db = create_test_db();
        let root = temp_upload_root();
        let manager = UploadManager::new();
        let post_id = posts::create_post(&db, sample_post("Host post", true)).unwrap();

        let document = documents::attach(
            &db,
            &manager,
            &root.join("documents"),
            post_id,
            &upload("brief.pdf", b"bytes"),
        )
        .unwrap();

        documents::increment_download_count(&db, document.id).unwrap();
        documents::increment_download_count(&db, document.id).unwrap();

        let fetched = documents::get_document(&db, document.id).unwrap().unwrap();
        assert_eq!(fetched.download_count, 2);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_delete_document_removes_file_and_row() {
        let db = create_test_db();
        let root = temp_upload_root();
        let manager = UploadManager::new();
        let post_id = posts::create_post(&db, sample_post("Host post", true)).unwrap();

        let document = documents::attach(
            &db,
            &manager,
            &root.join("documents"),
            post_id,
            &upload("brief.pdf", b"bytes"),
        )
        .unwrap();

        let physical = root.join(document.file_path.trim_start_matches("/uploads/"));
        assert!(physical.exists());

        documents::delete_document(&db, &manager, &root, document.id).unwrap();

        assert!(!physical.exists());
        assert!(documents::get_document(&db, document.id).unwrap().is_none());

        // Deleting again is a no-op.
        documents::delete_document(&db, &manager, &root, document.id).unwrap();

        std::fs::remove_dir_all(&root).ok();
    }
}

mod message_integration_tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            full_name: "Ali Veli".to_string(),
            email: "ali@example.com".to_string(),
            phone: Some("+90 555 000 0000".to_string()),
            subject: Some("Consultation".to_string()),
            message: "I would like an appointment.".to_string(),
        }
    }

    #[test]
    fn test_create_and_read_message() {
        let db = create_test_db();
        let message = messages::create_message(&db, &form()).unwrap();

        assert!(!message.is_read);
        assert!(!message.is_replied);
        assert_eq!(messages::count_unread(&db).unwrap(), 1);

        messages::mark_read(&db, message.id).unwrap();
        assert_eq!(messages::count_unread(&db).unwrap(), 0);

        messages::mark_replied(&db, message.id).unwrap();
        let fetched = messages::get_message(&db, message.id).unwrap().unwrap();
        assert!(fetched.is_read);
        assert!(fetched.is_replied);
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        let db = create_test_db();

        let mut missing_name = form();
        missing_name.full_name = "  ".to_string();
        assert!(messages::create_message(&db, &missing_name).is_err());

        let mut bad_email = form();
        bad_email.email = "not-an-email".to_string();
        assert!(messages::create_message(&db, &bad_email).is_err());

        let mut empty_message = form();
        empty_message.message = String::new();
        assert!(messages::create_message(&db, &empty_message).is_err());

        let mut oversized = form();
        oversized.message = "x".repeat(2001);
        assert!(messages::create_message(&db, &oversized).is_err());

        assert!(messages::list_messages(&db).unwrap().is_empty());
    }

    #[test]
    fn test_delete_message() {
        let db = create_test_db();
        let message = messages::create_message(&db, &form()).unwrap();
        messages::delete_message(&db, message.id).unwrap();
        assert!(messages::get_message(&db, message.id).unwrap().is_none());
    }
}

mod settings_integration_tests {
    use super::*;

    #[test]
    fn test_seeded_settings_present() {
        let db = create_test_db();
        let map = settings::settings_map(&db).unwrap();
        for key in [
            "site_name",
            "site_description",
            "contact_phone",
            "contact_email",
            "office_address",
        ] {
            assert!(map.contains_key(key), "missing seeded setting {}", key);
        }
    }

    #[test]
    fn test_set_and_get_round_trip() {
        let db = create_test_db();
        settings::set_setting(&db, "contact_phone", "+90 212 000 00 00").unwrap();
        assert_eq!(
            settings::get_setting(&db, "contact_phone").unwrap().as_deref(),
            Some("+90 212 000 00 00")
        );

        settings::set_setting(&db, "brand_color", "#7c5e2a").unwrap();
        assert_eq!(
            settings::get_setting(&db, "brand_color").unwrap().as_deref(),
            Some("#7c5e2a")
        );
    }
}

//! Repository Integration Tests
//!
//! Every repository over an in-memory store and a pinned clock.

#[cfg(test)]
mod tests {
    use crate::clock::{Clock, FixedClock};
    use crate::document::Document;
    use crate::domain::{
        default_providers, default_tax_rates, CollectionKey, Provider, TaskPatch, TaskStatus, TaxRatePatch,
        Ticket, TicketPatch, TicketStatus, Topic, ValidationStatus,
    };
    use crate::error::DomainError;
    use crate::repository::{
        ChangeBus, DataContext, KeyValueStore, MemoryStore, PageRemoval, Repository, SearchableRepository,
        DEFAULT_HISTORY_CAPACITY,
    };
    use crate::validation::{LoginForm, PasswordChangeForm, TaskForm, Validate};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn setup() -> DataContext {
        DataContext::new(Arc::new(MemoryStore::new()), ChangeBus::new(), Arc::new(FixedClock::at_millis(NOW_MS)))
    }

    fn setup_with(entries: &[(&str, &str)]) -> DataContext {
        let store = MemoryStore::with_entries(entries.iter().copied());
        DataContext::new(Arc::new(store), ChangeBus::new(), Arc::new(FixedClock::at_millis(NOW_MS)))
    }

    fn ticket(name: &str) -> Ticket {
        Ticket::new(
            name.to_string(),
            Topic::Icms,
            "Dúvida sobre ICMS-ST".to_string(),
            FixedClock::at_millis(NOW_MS).0,
        )
    }

    #[test]
    fn test_create_adds_one_with_unique_id() {
        let ctx = setup();
        let repo = ctx.tickets();

        let a = repo.create(ticket("Ana")).expect("Failed to create");
        let b = repo.create(ticket("Bruno")).expect("Failed to create");

        let items = repo.list();
        assert_eq!(items.len(), 2);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id, NOW_MS.to_string());
        assert_eq!(repo.find_by_id(&b.id).unwrap().name, "Bruno");
    }

    #[test]
    fn test_update_touches_only_target() {
        let ctx = setup();
        let repo = ctx.tickets();
        let a = repo.create(ticket("Ana")).unwrap();
        let b = repo.create(ticket("Bruno")).unwrap();

        let updated = repo
            .update_by_id(&a.id, TicketPatch::Status(TicketStatus::Resolved))
            .expect("Update failed");
        assert_eq!(updated.status, TicketStatus::Resolved);
        assert_eq!(updated.id, a.id);

        let untouched = repo.find_by_id(&b.id).unwrap();
        assert_eq!(untouched, b);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let ctx = setup();
        let result = ctx.tickets().update_by_id("nope", TicketPatch::Description("x".into()));
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let ctx = setup();
        let repo = ctx.tasks();
        let task = TaskForm { title: "Conferir SPED".into() }
            .validate(ctx.clock.now())
            .unwrap();
        let created = repo.create(task).unwrap();

        assert!(repo.delete_by_id(&created.id).expect("Delete failed"));
        assert!(repo.find_by_id(&created.id).is_none());
        assert!(!repo.delete_by_id(&created.id).unwrap());
    }

    #[test]
    fn test_toggle_task() {
        let ctx = setup();
        let repo = ctx.tasks();
        let task = TaskForm { title: "Fechar apuração".into() }
            .validate(ctx.clock.now())
            .unwrap();
        let created = repo.create(task).unwrap();
        let toggled = repo.update_by_id(&created.id, TaskPatch::Toggle).unwrap();
        assert_eq!(toggled.status, TaskStatus::Done);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let ctx = setup();
        ctx.seed_defaults().unwrap();
        let first = ctx.tax_rates().list();
        assert_eq!(first.len(), default_tax_rates().len());

        ctx.tax_rates()
            .update_by_id("SP", TaxRatePatch::InternalRate(20.0))
            .unwrap();
        ctx.seed_defaults().unwrap();

        let sp = ctx.tax_rates().find_by_id("SP").unwrap();
        assert_eq!(sp.internal_destination_rate, 20.0);
        assert_eq!(ctx.providers().list().len(), default_providers().len());
    }

    #[test]
    fn test_seed_skips_existing_empty_collection() {
        let ctx = setup_with(&[("prestadores", "[]")]);
        assert!(!ctx.providers().seed_if_absent(default_providers()).unwrap());
        assert!(ctx.providers().list().is_empty());
    }

    #[test]
    fn test_restore_defaults_discards_edits() {
        let ctx = setup();
        ctx.seed_defaults().unwrap();
        ctx.tax_rates()
            .update_by_id("SP", TaxRatePatch::InternalRate(25.0))
            .unwrap();
        ctx.tax_rates().restore_defaults().unwrap();
        assert_eq!(ctx.tax_rates().list(), default_tax_rates());
    }

    #[test]
    fn test_corrupt_collection_lists_empty() {
        let ctx = setup_with(&[("chamados", "{{{ not json")]);
        assert!(ctx.tickets().list().is_empty());

        let result = ctx.tickets().create(ticket("Carla"));
        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert_eq!(ctx.store.read("chamados").unwrap().as_deref(), Some("{{{ not json"));
    }

    #[test]
    fn test_unreadable_record_survives_writes() {
        let stored = r#"[
            {"id":"1","name":"Ana","topic":"Folha","description":"Assunto antigo","status":"Aberto","createdAt":"2023-11-14T22:13:20Z"},
            {"id":"2","name":"Bruno","topic":"ICMS","description":"Dúvida sobre DIFAL","status":"Aberto","createdAt":"2023-11-14T22:13:20Z"}
        ]"#;
        let ctx = setup_with(&[("chamados", stored)]);
        let repo = ctx.tickets();
        assert_eq!(repo.list().len(), 1);

        let caio = repo.create(ticket("Caio")).unwrap();
        repo.update_by_id("2", TicketPatch::Status(TicketStatus::Resolved)).unwrap();
        assert!(repo.delete_by_id(&caio.id).unwrap());

        let raw: Vec<serde_json::Value> =
            serde_json::from_str(&ctx.store.read("chamados").unwrap().unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0]["name"], "Ana");
        assert_eq!(raw[0]["topic"], "Folha");
        assert_eq!(raw[1]["status"], "Resolvido");
    }

    #[test]
    fn test_fresh_ids_skip_unreadable_records() {
        let stored = format!(r#"[{{"id":"{}","name":"Ana","topic":"Folha"}}]"#, NOW_MS);
        let ctx = setup_with(&[("chamados", stored.as_str())]);
        let created = ctx.tickets().create(ticket("Bruno")).unwrap();
        assert_ne!(created.id, NOW_MS.to_string());
    }

    #[test]
    fn test_duplicate_natural_key_conflicts() {
        let ctx = setup();
        ctx.seed_defaults().unwrap();
        let duplicate = Provider {
            nome: "Outra".into(),
            fornecedor: "000123".into(),
            ..Provider::default()
        };
        let result = ctx.providers().create(duplicate);
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[test]
    fn test_supplier_code_cannot_change_on_edit() {
        let ctx = setup();
        let repo = ctx.providers();
        let original = repo
            .create(Provider {
                nome: "Contábil Norte".into(),
                fornecedor: "000777".into(),
                ..Provider::default()
            })
            .unwrap();
        assert_eq!(original.id, "000777");

        let moved = Provider {
            fornecedor: "000999".into(),
            ..original.clone()
        };
        match repo.replace_provider(&original.id, moved) {
            Err(DomainError::InvalidInput(errors)) => assert!(errors.get("fornecedor").is_some()),
            other => panic!("unexpected: {:?}", other),
        }

        let renamed = Provider {
            nome: "Contábil Norte Ltda".into(),
            ..original.clone()
        };
        let updated = repo.replace_provider(&original.id, renamed).unwrap();
        assert_eq!(updated.nome, "Contábil Norte Ltda");
        assert_eq!(updated.id, "000777");

        let second = repo.create(Provider {
            nome: "Outro".into(),
            fornecedor: "000999".into(),
            ..Provider::default()
        });
        assert!(second.is_ok());
        assert_eq!(repo.list().iter().filter(|p| p.fornecedor == "000999").count(), 1);
    }

    #[test]
    fn test_adding_a_taken_supplier_code_is_rejected() {
        let ctx = setup();
        let repo = ctx.providers();
        repo.create(Provider {
            nome: "Com código".into(),
            fornecedor: "000555".into(),
            ..Provider::default()
        })
        .unwrap();
        let legacy = repo
            .create(Provider {
                nome: "Sem código".into(),
                ..Provider::default()
            })
            .unwrap();

        let claimed = Provider {
            fornecedor: "000555".into(),
            ..legacy.clone()
        };
        let result = repo.replace_provider(&legacy.id, claimed);
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_provider_search() {
        let ctx = setup();
        ctx.seed_defaults().unwrap();
        let found = ctx.providers().search("vista");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nome, "BOA VISTA S.A.");
        assert!(ctx.providers().search("nonexistent-co").is_empty());
    }

    #[test]
    fn test_writes_notify_bus() {
        let ctx = setup();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let _sub = ctx.bus.subscribe(CollectionKey::Tickets, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        let created = ctx.tickets().create(ticket("Ana")).unwrap();
        ctx.tickets()
            .update_by_id(&created.id, TicketPatch::Status(TicketStatus::InProgress))
            .unwrap();
        ctx.tickets().delete_by_id(&created.id).unwrap();
        ctx.tasks().replace_all(Vec::new()).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_deleting_last_page_removes_notebook() {
        let ctx = setup();
        let notebooks = ctx.notebooks();
        let notebook = notebooks
            .create_notebook("Rotinas".into(), "Introdução".into())
            .unwrap();
        assert_eq!(notebook.pages.len(), 1);

        let second = notebooks
            .add_page(&notebook.id, "Fechamento".into(), Document::from_markdown("# Passos"))
            .unwrap();
        let first_id = notebook.pages[0].id.clone();
        assert_ne!(second.id, first_id);

        assert_eq!(notebooks.delete_page(&notebook.id, &second.id).unwrap(), PageRemoval::Page);
        assert_eq!(notebooks.find_by_id(&notebook.id).unwrap().pages.len(), 1);

        assert_eq!(notebooks.delete_page(&notebook.id, &first_id).unwrap(), PageRemoval::Notebook);
        assert!(notebooks.find_by_id(&notebook.id).is_none());
        assert!(notebooks.list().is_empty());
    }

    #[test]
    fn test_update_page_content() {
        let ctx = setup();
        let notebooks = ctx.notebooks();
        let notebook = notebooks.create_notebook("ISS".into(), "Introdução".into()).unwrap();
        let page_id = notebook.pages[0].id.clone();

        let page = notebooks
            .update_page(&notebook.id, &page_id, None, Some(Document::from_markdown("Retenção na fonte")))
            .unwrap();
        assert_eq!(page.title, "Introdução");
        assert_eq!(page.content.plain_text().trim(), "Retenção na fonte");

        let missing = notebooks.update_page(&notebook.id, "missing", Some("x".into()), None);
        assert!(matches!(missing, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_history_capped_newest_first() {
        let ctx = setup();
        let history = ctx.validation_history();
        for i in 0..12 {
            history.record(&format!("nota{}.xml", i), ValidationStatus::Valid).unwrap();
        }
        let items = history.list();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].file_name, "nota11.xml");
        assert_eq!(items[9].file_name, "nota2.xml");
    }

    #[test]
    fn test_history_batch_is_one_write() {
        let ctx = setup();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let _sub = ctx.bus.subscribe(CollectionKey::ValidationHistory, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        let batch = vec![
            ("a.xml".to_string(), ValidationStatus::Valid),
            ("b.xml".to_string(), ValidationStatus::Invalid),
        ];
        ctx.validation_history().record_many(&batch).unwrap();

        let items = ctx.validation_history().list();
        assert_eq!(items[0].file_name, "b.xml");
        assert_eq!(items[1].file_name, "a.xml");
        assert_ne!(items[0].id, items[1].id);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_history_capacity_from_config() {
        let ctx = setup_with(&[("deskConfig", r#"{"historyCapacity": 3}"#)]);
        for i in 0..5 {
            ctx.validation_history()
                .record(&format!("{}.xml", i), ValidationStatus::Invalid)
                .unwrap();
        }
        assert_eq!(ctx.validation_history().list().len(), 3);
    }

    #[test]
    fn test_history_capacity_never_exceeds_default() {
        let ctx = setup_with(&[("deskConfig", r#"{"historyCapacity": 50}"#)]);
        for i in 0..15 {
            ctx.validation_history()
                .record(&format!("{}.xml", i), ValidationStatus::Valid)
                .unwrap();
        }
        assert_eq!(ctx.validation_history().list().len(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_history_keeps_unreadable_entries() {
        let stored = r#"[{"id":"1","fileName":"antigo.xml","date":"2023-11-14T22:13:20Z","status":"pendente"}]"#;
        let ctx = setup_with(&[("xmlValidationHistory", stored)]);
        assert!(ctx.validation_history().list().is_empty());

        ctx.validation_history().record("nova.xml", ValidationStatus::Valid).unwrap();
        assert_eq!(ctx.validation_history().list().len(), 1);
        let raw = ctx.store.read("xmlValidationHistory").unwrap().unwrap();
        assert!(raw.contains("antigo.xml"));
    }

    #[test]
    fn test_password_change_then_login() {
        let ctx = setup();
        let passwords = ctx.admin_password();
        assert!(passwords.login(&LoginForm { password: "admin".into() }).is_ok());

        passwords
            .change(&PasswordChangeForm {
                current: "admin".into(),
                new_password: "fiscal2024".into(),
                confirm: "fiscal2024".into(),
            })
            .unwrap();

        assert!(passwords.login(&LoginForm { password: "fiscal2024".into() }).is_ok());
        assert!(passwords.login(&LoginForm { password: "admin".into() }).is_err());
        assert_eq!(ctx.store.read("adminPassword").unwrap().as_deref(), Some("\"fiscal2024\""));
    }

    #[test]
    fn test_password_change_wrong_current() {
        let ctx = setup();
        let result = ctx.admin_password().change(&PasswordChangeForm {
            current: "wrong".into(),
            new_password: "novasenha".into(),
            confirm: "novasenha".into(),
        });
        match result {
            Err(DomainError::InvalidInput(errors)) => {
                assert_eq!(errors.get("currentPassword"), Some("Senha atual incorreta"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(ctx.admin_password().verify("admin"));
    }

    #[test]
    fn test_legacy_quoted_password() {
        let ctx = setup_with(&[("adminPassword", "\"segredo\"")]);
        assert!(ctx.admin_password().verify("segredo"));
    }

    #[test]
    fn test_legacy_raw_password() {
        let ctx = setup_with(&[("adminPassword", "segredo")]);
        assert!(ctx.admin_password().verify("segredo"));
    }

    #[test]
    fn test_quote_wrapped_password_is_kept_verbatim() {
        let ctx = setup();
        let passwords = ctx.admin_password();
        passwords
            .change(&PasswordChangeForm {
                current: "admin".into(),
                new_password: "\"cofre\"".into(),
                confirm: "\"cofre\"".into(),
            })
            .unwrap();

        assert!(passwords.login(&LoginForm { password: "\"cofre\"".into() }).is_ok());
        assert!(passwords.login(&LoginForm { password: "cofre".into() }).is_err());
    }
}

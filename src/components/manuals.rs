//! Manuals Screen
//!
//! Notebook sidebar and a Markdown page editor with live preview. Images and
//! attachments are embedded inline as `data:` links.

use fiscal_core::document::{render_html, Document};
use fiscal_core::domain::{CollectionKey, ManualPage};
use fiscal_core::repository::PageRemoval;
use fiscal_core::validation::{FieldErrors, NotebookForm, PageForm};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::components::{DeleteConfirmButton, FieldError};
use crate::context::use_app;

type Selection = Option<(String, String)>;

#[component]
fn NewNotebookForm(selection: RwSignal<Selection>) -> impl IntoView {
    let ctx = use_app();
    let title = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = NotebookForm {
            title: title.get_untracked(),
            first_page_title: String::new(),
        };
        match commands::create_notebook(&ctx.data(), &form) {
            Ok(notebook) => {
                title.set(String::new());
                errors.set(FieldErrors::new());
                if let Some(first) = notebook.pages.first() {
                    selection.set(Some((notebook.id.clone(), first.id.clone())));
                }
            }
            Err(e) => {
                errors.set(e.fields());
                ctx.error(e.to_string());
            }
        }
    };

    view! {
        <form class="new-notebook" on:submit=on_submit>
            <input
                type="text"
                placeholder="Novo caderno"
                prop:value=move || title.get()
                on:input=move |ev| title.set(event_target_value(&ev))
            />
            <button type="submit">"+"</button>
            <FieldError errors=errors field="title" />
        </form>
    }
}

#[component]
fn NotebookSidebar(selection: RwSignal<Selection>) -> impl IntoView {
    let ctx = use_app();
    let notebooks = Memo::new(move |_| {
        ctx.track(CollectionKey::Notebooks);
        commands::list_notebooks(&ctx.data())
    });

    let add_page = move |notebook_id: String| {
        let form = PageForm {
            title: "Nova página".to_string(),
            content: String::new(),
        };
        match commands::add_page(&ctx.data(), &notebook_id, &form) {
            Ok(page) => selection.set(Some((notebook_id, page.id))),
            Err(e) => ctx.error(e.to_string()),
        }
    };

    view! {
        <aside class="notebook-sidebar">
            <NewNotebookForm selection=selection />
            <For
                each=move || notebooks.get()
                key=|nb| (nb.id.clone(), nb.title.clone(), nb.pages.iter().map(|p| p.title.clone()).collect::<Vec<_>>())
                children=move |notebook| {
                    let notebook_id = notebook.id.clone();
                    let delete_id = notebook.id.clone();
                    let on_delete = Callback::new(move |_| match commands::delete_notebook(&ctx.data(), &delete_id) {
                        Ok(_) => {
                            if selection.get_untracked().is_some_and(|(nb, _)| nb == delete_id) {
                                selection.set(None);
                            }
                            ctx.success("Caderno excluído");
                        }
                        Err(e) => ctx.error(e.to_string()),
                    });
                    view! {
                        <div class="notebook">
                            <div class="notebook-header">
                                <strong>{notebook.title.clone()}</strong>
                                <button class="add-btn" title="Nova página" on:click={
                                    let id = notebook_id.clone();
                                    move |_| add_page(id.clone())
                                }>
                                    "+"
                                </button>
                                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
                            </div>
                            <ul class="pages">
                                {notebook
                                    .pages
                                    .iter()
                                    .map(|page| {
                                        let pair = (notebook_id.clone(), page.id.clone());
                                        let active = pair.clone();
                                        view! {
                                            <li
                                                class=move || {
                                                    if selection.get().as_ref() == Some(&active) { "page active" } else { "page" }
                                                }
                                                on:click=move |_| selection.set(Some(pair.clone()))
                                            >
                                                {page.title.clone()}
                                            </li>
                                        }
                                    })
                                    .collect_view()}
                            </ul>
                        </div>
                    }
                }
            />
        </aside>
    }
}

#[component]
fn PageEditor(notebook_id: String, notebook_title: String, page: ManualPage, selection: RwSignal<Selection>) -> impl IntoView {
    let ctx = use_app();
    let page_id = page.id.clone();
    let form = RwSignal::new(PageForm {
        title: page.title.clone(),
        content: page.content.to_markdown(),
    });
    let notebook_name = RwSignal::new(notebook_title);
    let errors = RwSignal::new(FieldErrors::new());
    let preview = Memo::new(move |_| form.with(|f| render_html(&Document::from_markdown(&f.content))));

    let ids = StoredValue::new((notebook_id, page_id));

    let save = move |_| {
        let (nb, pg) = ids.get_value();
        match commands::save_page(&ctx.data(), &nb, &pg, &form.get_untracked()) {
            Ok(_) => {
                errors.set(FieldErrors::new());
                ctx.success("Página salva");
            }
            Err(e) => {
                errors.set(e.fields());
                ctx.error(e.to_string());
            }
        }
    };

    let rename = move |_| {
        let (nb, _) = ids.get_value();
        let form = NotebookForm {
            title: notebook_name.get_untracked(),
            first_page_title: String::new(),
        };
        if let Err(e) = commands::rename_notebook(&ctx.data(), &nb, &form) {
            ctx.error(e.to_string());
        }
    };

    let on_delete = Callback::new(move |_| {
        let (nb, pg) = ids.get_value();
        match commands::delete_page(&ctx.data(), &nb, &pg) {
            Ok(PageRemoval::Page) => {
                selection.set(None);
                ctx.success("Página excluída");
            }
            Ok(PageRemoval::Notebook) => {
                selection.set(None);
                ctx.success("Última página excluída; caderno removido");
            }
            Err(e) => ctx.error(e.to_string()),
        }
    });

    let embed = move |ev: web_sys::Event, as_image: bool| {
        let files = commands::files_from_event(&ev);
        spawn_local(async move {
            for file in files {
                let name = file.name();
                match commands::read_file_data_url(&file).await {
                    Ok(url) => {
                        let snippet = if as_image {
                            format!("\n\n![{}]({})\n", name, url)
                        } else {
                            format!("\n\n[{}]({})\n", name, url)
                        };
                        // Editor may have been closed while reading
                        if form.try_update(|f| f.content.push_str(&snippet)).is_none() {
                            return;
                        }
                    }
                    Err(e) => {
                        log::warn!("Could not read {}: {}", name, e);
                        ctx.error(format!("Falha ao ler '{}'", name));
                    }
                }
            }
        });
    };

    view! {
        <div class="page-editor">
            <div class="notebook-title">
                <input
                    type="text"
                    prop:value=move || notebook_name.get()
                    on:input=move |ev| notebook_name.set(event_target_value(&ev))
                    on:blur=rename
                />
            </div>
            <div class="page-toolbar">
                <input
                    type="text"
                    class="page-title"
                    prop:value=move || form.with(|f| f.title.clone())
                    on:input=move |ev| form.update(|f| f.title = event_target_value(&ev))
                />
                <FieldError errors=errors field="title" />
                <label class="toolbar-btn">
                    "Imagem"
                    <input type="file" accept="image/*" class="hidden" on:change=move |ev| embed(ev, true) />
                </label>
                <label class="toolbar-btn">
                    "Anexo"
                    <input type="file" class="hidden" on:change=move |ev| embed(ev, false) />
                </label>
                <button class="save-btn" on:click=save>"Salvar"</button>
                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete prompt="Excluir página?" />
            </div>
            <div class="editor-split">
                <textarea
                    class="markdown-input"
                    prop:value=move || form.with(|f| f.content.clone())
                    on:input=move |ev| form.update(|f| f.content = event_target_value(&ev))
                ></textarea>
                <div class="markdown-preview" inner_html=move || preview.get()></div>
            </div>
            <p class="muted">{format!("Atualizada em {}", page.updated_at.format("%d/%m/%Y %H:%M"))}</p>
        </div>
    }
}

#[component]
pub fn Manuals() -> impl IntoView {
    let ctx = use_app();
    let selection = RwSignal::new(None::<(String, String)>);

    view! {
        <section class="manuals">
            <NotebookSidebar selection=selection />
            <main class="manual-main">
                {move || {
                    let Some((nb_id, pg_id)) = selection.get() else {
                        return view! { <p class="muted">"Selecione uma página"</p> }.into_any();
                    };
                    // Read untracked so saving does not rebuild the editor
                    match commands::find_page(&ctx.data(), &nb_id, &pg_id) {
                        Some((title, page)) => view! {
                            <PageEditor notebook_id=nb_id notebook_title=title page=page selection=selection />
                        }
                        .into_any(),
                        None => view! { <p class="muted">"Página não encontrada"</p> }.into_any(),
                    }
                }}
            </main>
        </section>
    }
}

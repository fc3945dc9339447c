use crate::components::ui::{
    Alert, AlertDescription, Badge, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label, Spinner, Textarea,
};
use crate::form::{MediaSlot, SectionForm};
use crate::models::FileAttachment;
use crate::payload::build_payload;
use crate::preview::{ObjectUrls, PreviewManager, PreviewSource};
use crate::schema::{
    FieldKind, MediaArity, SectionSchema, ALL_SECTIONS, CELEBRATION, PRIVATE_CHARTER, SPORT,
    STUDY_ABROAD, VOYAGE,
};
use crate::state::AppContext;
use crate::store::CollectionStore;
use crate::util::resolve_media_url;
use leptos::logging;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_location;
use std::time::Duration;
use wasm_bindgen::JsCast;

/// Pull name, mime and bytes out of a chosen browser file. Bytes are read
/// eagerly so the draft and payload stay plain data.
async fn read_chosen_file(file: web_sys::File) -> Option<FileAttachment> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .ok()?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    Some(FileAttachment {
        name: file.name(),
        mime: file.type_(),
        bytes,
    })
}

/// Display title for one section card in the list view.
fn section_card_title(schema: &SectionSchema, doc: &crate::models::SectionDocument) -> String {
    schema
        .heading_fields
        .first()
        .and_then(|f| doc.fields.get(f.name))
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| format!("Untitled {}", schema.title))
}

#[derive(Clone)]
struct Notice {
    text: String,
    error: bool,
}

#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let location = use_location();
    let pathname = move || location.pathname.get();

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex w-full max-w-[1200px] gap-6 px-4 py-8">
                <aside class="w-56 shrink-0">
                    <div class="mb-4 space-y-1">
                        <div class="text-sm font-semibold">"Charterwave"</div>
                        <div class="text-xs text-muted-foreground">"Site content"</div>
                    </div>
                    <nav class="flex flex-col gap-1">
                        {ALL_SECTIONS
                            .iter()
                            .map(|s| {
                                let href = format!("/{}", s.key);
                                let href_for_class = href.clone();
                                let link_class = move || {
                                    if pathname() == href_for_class {
                                        "rounded-md bg-accent px-3 py-2 text-sm font-medium text-accent-foreground"
                                    } else {
                                        "rounded-md px-3 py-2 text-sm text-muted-foreground hover:bg-accent/50"
                                    }
                                };
                                view! {
                                    <a href=href class=link_class>
                                        {s.title}
                                    </a>
                                }
                            })
                            .collect_view()}
                    </nav>
                </aside>

                <main class="min-w-0 flex-1">{children()}</main>
            </div>
        </div>
    }
}

/// Generic editor for one "section collection": list of persisted section
/// documents plus a single create/edit form driven by the section's schema.
#[component]
pub fn CollectionEditor(schema: &'static SectionSchema) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let store: RwSignal<CollectionStore> = RwSignal::new(CollectionStore::new());
    let form: RwSignal<SectionForm> = RwSignal::new(SectionForm::new(schema));
    let previews: RwSignal<PreviewManager<ObjectUrls>> =
        RwSignal::new(PreviewManager::new(ObjectUrls));

    let asset_base = StoredValue::new(
        app_state
            .0
            .api_client
            .with_untracked(|c| c.config().asset_base.clone()),
    );

    // Dismissible, auto-expiring notice. The sequence guard keeps an old
    // timer from clearing a newer message.
    let notice: RwSignal<Option<Notice>> = RwSignal::new(None);
    let notice_seq: RwSignal<u64> = RwSignal::new(0);

    let show_notice = move |text: String, error: bool| {
        let seq = notice_seq.get_untracked().wrapping_add(1);
        notice_seq.set(seq);
        notice.set(Some(Notice { text, error }));

        leptos_dom::helpers::set_timeout(
            move || {
                if notice_seq.try_get_untracked() == Some(seq) {
                    notice.set(None);
                }
            },
            Duration::from_millis(4000),
        );
    };

    let load = move || {
        if store.with_untracked(|s| s.is_loading()) {
            return;
        }

        let client = app_state.0.api_client.get_untracked();
        store.update(|s| s.begin_load());

        spawn_local(async move {
            match client.list_sections(schema).await {
                Ok(sections) => store.update(|s| s.apply_loaded(sections)),
                // A failed load keeps the stale list visible.
                Err(e) => {
                    logging::warn!("section list load failed: {e}");
                    store.update(|s| s.apply_failed(e.to_string()));
                }
            }
        });
    };

    Effect::new(move |_| {
        load();
    });

    let open_create = move |_| {
        form.update(|f| f.begin_create());
        previews.update(|p| p.init_create());
    };

    let open_edit = move |id: String| {
        let Some(doc) = store.with_untracked(|s| s.find(&id).cloned()) else {
            return;
        };
        form.update(|f| f.begin_edit(&doc));
        previews.update(|p| p.init_edit(&doc, &asset_base.get_value()));
        notice.set(None);
    };

    let cancel_form = move |_| {
        form.update(|f| f.cancel());
        previews.update(|p| p.reset());
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        if !form.try_update(|f| f.begin_submit()).unwrap_or(false) {
            show_notice(
                "Fill in the required fields and add an image to every item.".to_string(),
                true,
            );
            return;
        }

        let payload = form.with_untracked(|f| build_payload(schema, f));
        let editing = form.with_untracked(|f| f.editing_id().map(String::from));
        let client = app_state.0.api_client.get_untracked();

        spawn_local(async move {
            let result = match editing {
                Some(id) => client
                    .update_section(schema, &id, payload)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string()),
                None => client
                    .create_section(schema, payload)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string()),
            };

            match result {
                Ok(()) => {
                    form.update(|f| f.submit_succeeded());
                    previews.update(|p| p.reset());
                    show_notice("Saved.".to_string(), false);
                    load();
                }
                Err(e) => {
                    logging::warn!("section save failed: {e}");
                    // Draft stays intact so the user can retry.
                    form.update(|f| f.submit_failed(e));
                }
            }
        });
    };

    // Delete confirmation state: (id, display label).
    let delete_target: RwSignal<Option<(String, String)>> = RwSignal::new(None);
    let delete_loading: RwSignal<bool> = RwSignal::new(false);

    let on_confirm_delete = move |_| {
        if delete_loading.get_untracked() {
            return;
        }
        let Some((id, _)) = delete_target.get_untracked() else {
            return;
        };

        let client = app_state.0.api_client.get_untracked();
        delete_loading.set(true);

        spawn_local(async move {
            match client.delete_section(schema, &id).await {
                Ok(message) => {
                    delete_target.set(None);

                    // If the deleted document was open in the form, drop it.
                    if form.with_untracked(|f| f.editing_id() == Some(id.as_str())) {
                        form.update(|f| f.cancel());
                        previews.update(|p| p.reset());
                    }

                    show_notice(message, false);
                    load();
                }
                Err(e) => {
                    logging::warn!("section delete failed: {e}");
                    show_notice(e.to_string(), true);
                }
            }
            delete_loading.set(false);
        });
    };

    // One chosen file lands in (item, slot); gallery items append.
    let pick_files = move |item: usize, ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(files) = input.files() else {
            return;
        };

        let chosen: Vec<web_sys::File> = (0..files.length()).filter_map(|i| files.get(i)).collect();
        if chosen.is_empty() {
            return;
        }

        let single = schema.item.media == MediaArity::Single;

        spawn_local(async move {
            for file in chosen {
                let Some(att) = read_chosen_file(file).await else {
                    continue;
                };

                let slot = if single {
                    0
                } else {
                    form.with_untracked(|f| {
                        f.items.get(item).map(|d| d.slots.len()).unwrap_or(0)
                    })
                };

                form.update(|f| f.set_item_file(item, slot, att.clone()));
                previews.update(|p| p.set_local(item, slot, &att));

                if single {
                    break;
                }
            }
        });
    };

    let remove_slot = move |item: usize, slot: usize| {
        // When the slot is a pending replacement, dropping it reverts to the
        // persisted image it replaced.
        let restore = form.with_untracked(|f| {
            f.items.get(item).and_then(|d| match d.slots.get(slot) {
                Some(MediaSlot::Pending {
                    replaces: Some(path),
                    ..
                }) => Some(path.clone()),
                _ => None,
            })
        });

        form.update(|f| f.clear_item_file(item, slot));
        previews.update(|p| {
            let restore_url = restore
                .as_ref()
                .map(|path| resolve_media_url(&asset_base.get_value(), path));
            p.clear_local(item, slot, restore_url);
        });
    };

    let add_item = move |_| {
        form.update(|f| f.add_item());
        previews.update(|p| p.add_item());
    };

    let remove_item = move |item: usize| {
        if form.try_update(|f| f.remove_item(item)).unwrap_or(false) {
            previews.update(|p| p.remove_item(item));
        }
    };

    let heading_inputs = move || {
        schema
            .heading_fields
            .iter()
            .map(|f| {
                let name = f.name;
                let value = Signal::derive(move || {
                    form.with(|fm| fm.fields.get(name).cloned().unwrap_or_default())
                });
                let on_change =
                    Callback::new(move |v: String| form.update(|fm| fm.set_field(name, v)));

                let control = match f.kind {
                    FieldKind::Text => view! {
                        <Input id=name value=value on_change=on_change required=f.required />
                    }
                    .into_any(),
                    FieldKind::Textarea => view! {
                        <Textarea id=name value=value on_change=on_change />
                    }
                    .into_any(),
                };

                view! {
                    <div class="flex flex-col gap-2">
                        <Label html_for=name>{f.label}</Label>
                        {control}
                    </div>
                }
            })
            .collect_view()
    };

    let item_rows = move || {
        let count = form.with(|f| f.items.len());
        let can_remove = count > 1;

        (0..count)
            .map(|i| {
                let field_inputs = schema
                    .item
                    .fields
                    .iter()
                    .map(|f| {
                        let name = f.name;
                        let id = format!("item-{}-{}", i, name);
                        let value = Signal::derive(move || {
                            form.with(|fm| {
                                fm.items
                                    .get(i)
                                    .and_then(|d| d.fields.get(name))
                                    .cloned()
                                    .unwrap_or_default()
                            })
                        });
                        let on_change = Callback::new(move |v: String| {
                            form.update(|fm| fm.set_item_field(i, name, v))
                        });

                        let control = match f.kind {
                            FieldKind::Text => view! {
                                <Input id=id.clone() value=value on_change=on_change required=f.required />
                            }
                            .into_any(),
                            FieldKind::Textarea => view! {
                                <Textarea id=id.clone() value=value on_change=on_change />
                            }
                            .into_any(),
                        };

                        view! {
                            <div class="flex flex-col gap-2">
                                <Label html_for=id>{f.label}</Label>
                                {control}
                            </div>
                        }
                    })
                    .collect_view();

                let slot_previews = move || {
                    previews.with(|p| {
                        p.previews(i)
                            .iter()
                            .enumerate()
                            .map(|(slot, preview)| {
                                let url = preview.url.clone();
                                let existing = p.is_existing(i, slot)
                                    && preview.source == PreviewSource::Persisted;
                                view! {
                                    <div class="relative">
                                        <img
                                            src=url
                                            class="h-24 w-24 rounded-md border object-cover"
                                        />
                                        <Badge class="absolute left-1 top-1 bg-background/80">
                                            {if existing { "Existing" } else { "New" }}
                                        </Badge>
                                        <Button
                                            variant=ButtonVariant::Ghost
                                            size=ButtonSize::Sm
                                            attr:r#type="button"
                                            class="absolute right-0 top-0"
                                            on:click=move |_| remove_slot(i, slot)
                                        >
                                            "x"
                                        </Button>
                                    </div>
                                }
                            })
                            .collect_view()
                    })
                };

                // Re-keyed on input_epoch so a form reset remounts the file
                // input instead of poking at its DOM value.
                let file_input = move || {
                    let epoch = form.with(|f| f.input_epoch);
                    let required = form.with(|f| f.file_input_required(i));
                    let multiple = schema.item.media == MediaArity::Gallery;

                    (schema.item.media != MediaArity::None).then(|| {
                        view! {
                            <input
                                type="file"
                                accept="image/*"
                                class="text-sm"
                                data-epoch=epoch.to_string()
                                required=required
                                multiple=multiple
                                on:change=move |ev| pick_files(i, ev)
                            />
                        }
                    })
                };

                view! {
                    <div class="flex flex-col gap-3 rounded-md border p-4">
                        <div class="flex items-center justify-between">
                            <div class="text-sm font-medium">
                                {format!("{} {}", schema.item.noun, i + 1)}
                            </div>
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Sm
                                attr:r#type="button"
                                attr:disabled=!can_remove
                                on:click=move |_| remove_item(i)
                            >
                                "Remove"
                            </Button>
                        </div>

                        {field_inputs}

                        <div class="flex flex-wrap items-end gap-3">
                            {slot_previews}
                            {file_input}
                        </div>
                    </div>
                }
            })
            .collect_view()
    };

    let section_list = move || {
        store
            .with(|s| s.sections.clone())
            .into_iter()
            .map(|doc| {
                let title = section_card_title(schema, &doc);
                let media_count: usize = doc.items.iter().map(|it| it.media.len()).sum();
                let summary = format!("{} items, {} images", doc.items.len(), media_count);
                let edit_id = doc.id.clone();
                let delete_id = doc.id.clone();
                let delete_label = title.clone();

                view! {
                    <div class="flex items-center justify-between rounded-md border px-4 py-3">
                        <div class="flex flex-col gap-1">
                            <div class="text-sm font-medium">{title}</div>
                            <div class="text-xs text-muted-foreground">{summary}</div>
                        </div>
                        <div class="flex items-center gap-2">
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                on:click=move |_| open_edit(edit_id.clone())
                            >
                                "Edit"
                            </Button>
                            <Button
                                variant=ButtonVariant::Destructive
                                size=ButtonSize::Sm
                                on:click=move |_| {
                                    delete_target.set(Some((delete_id.clone(), delete_label.clone())))
                                }
                            >
                                "Delete"
                            </Button>
                        </div>
                    </div>
                }
            })
            .collect_view()
    };

    view! {
        <div class="flex flex-col gap-4">
            <div class="flex items-center justify-between">
                <div class="space-y-1">
                    <h1 class="text-xl font-semibold">{schema.title}</h1>
                    <p class="text-xs text-muted-foreground">
                        {move || store.with(|s| format!("{} sections", s.sections.len()))}
                    </p>
                </div>

                <div class="flex items-center gap-2">
                    <Button
                        variant=ButtonVariant::Outline
                        attr:disabled=move || store.with(|s| s.is_loading())
                        on:click=move |_| load()
                    >
                        <span class="inline-flex items-center gap-2">
                            <Show when=move || store.with(|s| s.is_loading()) fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            {move || if store.with(|s| s.is_loading()) { "Refreshing" } else { "Refresh" }}
                        </span>
                    </Button>
                    <Button on:click=open_create>"New section"</Button>
                </div>
            </div>

            <Show when=move || notice.get().is_some() fallback=|| ().into_view()>
                {move || {
                    notice.get().map(|n| {
                        let border = if n.error { "border-destructive/30" } else { "" };
                        let text = if n.error { "text-destructive" } else { "" };
                        view! {
                            <div class="cursor-pointer" on:click=move |_| notice.set(None)>
                                <Alert class=border>
                                    <AlertDescription class=text>{n.text.clone()}</AlertDescription>
                                </Alert>
                            </div>
                        }
                    })
                }}
            </Show>

            <Show
                when=move || store.with(|s| s.error().is_some())
                fallback=|| ().into_view()
            >
                {move || {
                    store.with(|s| s.error().map(String::from)).map(|e| view! {
                        <Alert class="border-destructive/30">
                            <AlertDescription class="text-destructive">
                                {format!("Load failed: {e}. Showing the last loaded list.")}
                            </AlertDescription>
                        </Alert>
                    })
                }}
            </Show>

            <Show when=move || form.with(|f| f.is_open()) fallback=|| ().into_view()>
                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">
                            {move || {
                                if form.with(|f| f.editing_id().is_some()) {
                                    format!("Edit {}", schema.title)
                                } else {
                                    format!("New {}", schema.title)
                                }
                            }}
                        </CardTitle>
                        <CardDescription>
                            {format!("{} content with one or more {}s", schema.title, schema.item.noun.to_lowercase())}
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-4" on:submit=on_submit>
                            {heading_inputs}

                            <div class="flex items-center justify-between">
                                <div class="text-sm font-medium">
                                    {format!("{}s", schema.item.noun)}
                                </div>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    attr:r#type="button"
                                    on:click=add_item
                                >
                                    {format!("Add {}", schema.item.noun.to_lowercase())}
                                </Button>
                            </div>

                            {item_rows}

                            <Show
                                when=move || form.with(|f| f.last_error.is_some())
                                fallback=|| ().into_view()
                            >
                                {move || {
                                    form.with(|f| f.last_error.clone()).map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive">{e}</AlertDescription>
                                        </Alert>
                                    })
                                }}
                            </Show>

                            <div class="flex items-center gap-2">
                                <Button attr:disabled=move || form.with(|f| f.is_submitting())>
                                    <span class="inline-flex items-center gap-2">
                                        <Show
                                            when=move || form.with(|f| f.is_submitting())
                                            fallback=|| ().into_view()
                                        >
                                            <Spinner />
                                        </Show>
                                        {move || {
                                            if form.with(|f| f.is_submitting()) {
                                                "Saving..."
                                            } else {
                                                "Save"
                                            }
                                        }}
                                    </span>
                                </Button>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    attr:r#type="button"
                                    on:click=cancel_form
                                >
                                    "Cancel"
                                </Button>
                            </div>
                        </form>
                    </CardContent>
                </Card>
            </Show>

            <Card>
                <CardHeader>
                    <CardTitle>"Sections"</CardTitle>
                </CardHeader>
                <CardContent>
                    <Show
                        when=move || store.with(|s| !s.sections.is_empty())
                        fallback=move || view! {
                            <div class="text-xs text-muted-foreground">
                                {move || {
                                    if store.with(|s| s.is_loading()) {
                                        "Loading sections..."
                                    } else {
                                        "No sections yet."
                                    }
                                }}
                            </div>
                        }
                    >
                        <div class="flex flex-col gap-3">{section_list}</div>
                    </Show>
                </CardContent>
            </Card>

            <Show when=move || delete_target.get().is_some() fallback=|| ().into_view()>
                <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/50">
                    <Card class="w-full max-w-sm bg-background">
                        <CardHeader>
                            <CardTitle class="text-lg">"Delete section"</CardTitle>
                            <CardDescription>
                                {move || {
                                    delete_target
                                        .get()
                                        .map(|(_, label)| format!("Delete \"{label}\"? This cannot be undone."))
                                        .unwrap_or_default()
                                }}
                            </CardDescription>
                        </CardHeader>
                        <CardContent class="flex justify-end gap-2">
                            <Button
                                variant=ButtonVariant::Outline
                                attr:disabled=move || delete_loading.get()
                                on:click=move |_| delete_target.set(None)
                            >
                                "Cancel"
                            </Button>
                            <Button
                                variant=ButtonVariant::Destructive
                                attr:disabled=move || delete_loading.get()
                                on:click=on_confirm_delete
                            >
                                {move || if delete_loading.get() { "Deleting..." } else { "Delete" }}
                            </Button>
                        </CardContent>
                    </Card>
                </div>
            </Show>
        </div>
    }
}

#[component]
pub fn CelebrationPage() -> impl IntoView {
    view! { <CollectionEditor schema=&CELEBRATION /> }
}

#[component]
pub fn PrivateCharterPage() -> impl IntoView {
    view! { <CollectionEditor schema=&PRIVATE_CHARTER /> }
}

#[component]
pub fn SportPage() -> impl IntoView {
    view! { <CollectionEditor schema=&SPORT /> }
}

#[component]
pub fn StudyAbroadPage() -> impl IntoView {
    view! { <CollectionEditor schema=&STUDY_ABROAD /> }
}

#[component]
pub fn VoyagePage() -> impl IntoView {
    view! { <CollectionEditor schema=&VOYAGE /> }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionDocument;
    use std::collections::BTreeMap;

    #[test]
    fn test_section_card_title_falls_back_when_heading_empty() {
        let mut doc = SectionDocument {
            id: "a".to_string(),
            fields: BTreeMap::new(),
            items: Vec::new(),
        };
        assert_eq!(section_card_title(&VOYAGE, &doc), "Untitled Voyage");

        doc.fields
            .insert("heading".to_string(), "Mediterranean".to_string());
        assert_eq!(section_card_title(&VOYAGE, &doc), "Mediterranean");
    }
}

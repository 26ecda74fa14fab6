use crate::{
    auth::{Access, ChalkSession, authorize},
    data::{
        aria_invalid,
        incident::{Incident, IncidentDraft, IncidentForm, IncidentValidationError, NewIncident},
        student::Student,
        user::User,
    },
    error::{ChalkResult, MissingIncidentSnafu},
    flash::Flash,
    maud_conveniences::{
        INPUT_CLASSES, detail, form_element, form_submit_button, link_button, multiline,
        render_table, title,
    },
    routes::outcome::{HxRequest, Outcome},
    state::ChalkState,
    store::{IncidentStore, StudentStore, UserStore},
};
use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use axum_login::tower_sessions::Session;
use maud::{Markup, html};
use snafu::OptionExt;

pub const UPDATED: &str = "Ocorrência atualizada com sucesso";
pub const DELETED: &str = "Ocorrência excluída com sucesso";
pub const DELETE_FAILED: &str = "Erro ao excluir ocorrência";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentPage {
    Index(Vec<Incident>),
    Show(Incident),
    New {
        draft: IncidentDraft,
        errors: IncidentValidationError,
    },
    Edit {
        id: i32,
        draft: IncidentDraft,
        errors: IncidentValidationError,
    },
}

fn incident_path(id: i32) -> String {
    format!("/incidents/{id}")
}

async fn check_draft<S: StudentStore + UserStore>(
    store: &S,
    draft: &IncidentDraft,
    current: &User,
) -> ChalkResult<Result<NewIncident, IncidentValidationError>> {
    let student_exists = match draft.student_id() {
        Some(id) => store.find_student(id).await?.is_some(),
        None => false,
    };
    let user_exists = match draft.user_id_or(current.id) {
        Some(id) if id == current.id => true,
        Some(id) => store.find_user(id).await?.is_some(),
        None => false,
    };

    Ok(draft.validate(current.id, student_exists, user_exists))
}

pub async fn index<S: IncidentStore>(
    store: &S,
    identity: Option<&User>,
) -> ChalkResult<Outcome<IncidentPage>> {
    if let Access::Denied(denial) = authorize(identity) {
        return Ok(denial.into());
    }

    Ok(Outcome::render(IncidentPage::Index(
        store.all_incidents().await?,
    )))
}

pub async fn show<S: IncidentStore>(
    store: &S,
    identity: Option<&User>,
    id: i32,
) -> ChalkResult<Outcome<IncidentPage>> {
    if let Access::Denied(denial) = authorize(identity) {
        return Ok(denial.into());
    }

    let incident = store
        .find_incident(id)
        .await?
        .context(MissingIncidentSnafu { id })?;
    Ok(Outcome::render(IncidentPage::Show(incident)))
}

pub fn new(identity: Option<&User>) -> Outcome<IncidentPage> {
    match authorize(identity) {
        Access::Denied(denial) => denial.into(),
        Access::Allowed(_) => Outcome::render(IncidentPage::New {
            draft: IncidentDraft::default(),
            errors: IncidentValidationError::empty(),
        }),
    }
}

pub async fn edit<S: IncidentStore>(
    store: &S,
    identity: Option<&User>,
    id: i32,
) -> ChalkResult<Outcome<IncidentPage>> {
    if let Access::Denied(denial) = authorize(identity) {
        return Ok(denial.into());
    }

    let incident = store
        .find_incident(id)
        .await?
        .context(MissingIncidentSnafu { id })?;
    Ok(Outcome::render(IncidentPage::Edit {
        id,
        draft: IncidentDraft::from_existing(&incident),
        errors: IncidentValidationError::empty(),
    }))
}

pub async fn create<S: IncidentStore + StudentStore + UserStore>(
    store: &S,
    identity: Option<&User>,
    form: IncidentForm,
) -> ChalkResult<Outcome<IncidentPage>> {
    let user = match authorize(identity) {
        Access::Allowed(user) => user,
        Access::Denied(denial) => return Ok(denial.into()),
    };

    let draft = IncidentDraft::default().apply(form);
    match check_draft(store, &draft, user).await? {
        Ok(new) => {
            let id = store.create_incident(new).await?;
            info!(id, user = ?user.id, "Created incident");
            Ok(Outcome::redirect(incident_path(id)))
        }
        Err(errors) => Ok(Outcome::render_with(
            IncidentPage::New { draft, errors },
            Flash::Error(errors.full_messages()),
        )),
    }
}

pub async fn update<S: IncidentStore + StudentStore + UserStore>(
    store: &S,
    identity: Option<&User>,
    id: i32,
    form: IncidentForm,
) -> ChalkResult<Outcome<IncidentPage>> {
    let user = match authorize(identity) {
        Access::Allowed(user) => user,
        Access::Denied(denial) => return Ok(denial.into()),
    };

    let incident = store
        .find_incident(id)
        .await?
        .context(MissingIncidentSnafu { id })?;
    let draft = IncidentDraft::from_existing(&incident).apply(form);

    match check_draft(store, &draft, user).await? {
        Ok(new) => {
            store.update_incident(id, new).await?;
            info!(id, user = ?user.id, "Updated incident");
            Ok(Outcome::redirect_with(
                incident_path(id),
                Flash::success(UPDATED),
            ))
        }
        Err(errors) => Ok(Outcome::render_with(
            IncidentPage::Edit { id, draft, errors },
            Flash::Error(errors.full_messages()),
        )),
    }
}

pub async fn destroy<S: IncidentStore>(
    store: &S,
    identity: Option<&User>,
    id: i32,
) -> ChalkResult<Outcome<IncidentPage>> {
    let user = match authorize(identity) {
        Access::Allowed(user) => user,
        Access::Denied(denial) => return Ok(denial.into()),
    };

    snafu::ensure!(
        store.find_incident(id).await?.is_some(),
        MissingIncidentSnafu { id }
    );

    Ok(if store.delete_incident(id).await? {
        info!(id, user = ?user.id, "Deleted incident");
        Outcome::redirect_with("/incidents", Flash::success(DELETED))
    } else {
        warn!(id, user = ?user.id, "Store refused to delete incident");
        Outcome::redirect_with("/incidents", Flash::error(DELETE_FAILED))
    })
}

pub async fn get_incidents(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
) -> ChalkResult<Response> {
    let outcome = index(&state.store(), auth.user.as_ref()).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| render_page(&state, page))
        .await
}

pub async fn get_incident(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Path(id): Path<i32>,
) -> ChalkResult<Response> {
    let outcome = show(&state.store(), auth.user.as_ref(), id).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| render_page(&state, page))
        .await
}

pub async fn get_new_incident(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
) -> ChalkResult<Response> {
    let outcome = new(auth.user.as_ref());
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| render_page(&state, page))
        .await
}

pub async fn get_edit_incident(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Path(id): Path<i32>,
) -> ChalkResult<Response> {
    let outcome = edit(&state.store(), auth.user.as_ref(), id).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| render_page(&state, page))
        .await
}

pub async fn post_new_incident(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Form(form): Form<IncidentForm>,
) -> ChalkResult<Response> {
    let outcome = create(&state.store(), auth.user.as_ref(), form).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| render_page(&state, page))
        .await
}

pub async fn put_incident(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Path(id): Path<i32>,
    Form(form): Form<IncidentForm>,
) -> ChalkResult<Response> {
    let outcome = update(&state.store(), auth.user.as_ref(), id, form).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| render_page(&state, page))
        .await
}

pub async fn delete_incident(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Path(id): Path<i32>,
) -> ChalkResult<Response> {
    let outcome = destroy(&state.store(), auth.user.as_ref(), id).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| render_page(&state, page))
        .await
}

async fn render_page(state: &ChalkState, page: IncidentPage) -> ChalkResult<Markup> {
    Ok(match page {
        IncidentPage::Index(incidents) => render_index(incidents),
        IncidentPage::Show(incident) => render_show(&incident),
        IncidentPage::New { draft, errors } => {
            let students = state.store().all_students().await?;
            render_form("Nova ocorrência", None, &draft, errors, &students)
        }
        IncidentPage::Edit { id, draft, errors } => {
            let students = state.store().all_students().await?;
            render_form("Editar ocorrência", Some(id), &draft, errors, &students)
        }
    })
}

fn summary(description: &str) -> String {
    const MAX_CHARS: usize = 80;

    let mut chars = description.chars();
    let mut summary: String = chars.by_ref().take(MAX_CHARS).collect();
    if chars.next().is_some() {
        summary.push('…');
    }
    summary
}

fn render_index(incidents: Vec<Incident>) -> Markup {
    let rows = incidents
        .into_iter()
        .map(|incident| {
            [
                html! {
                    a href=(incident_path(incident.id)) class="hover:text-blue-300 underline" {
                        (incident.date_incident.format("%d/%m/%Y %H:%M"))
                    }
                },
                html! {
                    a href={"/students/" (incident.student_id)} class="hover:text-blue-300 underline" {(incident.student_name)}
                },
                html! {(summary(&incident.description))},
                html! {(incident.user_name)},
            ]
        })
        .collect::<Vec<_>>();

    html! {
        div class="flex flex-row items-center justify-between mb-4" {
            (title("Ocorrências"))
            (link_button("/incidents/new", "Nova ocorrência"))
        }
        @if rows.is_empty() {
            p class="text-gray-400 italic" {"Nenhuma ocorrência registrada."}
        } @else {
            (render_table(["Data", "Aluno", "Descrição", "Registrada por"], rows))
        }
    }
}

fn render_show(incident: &Incident) -> Markup {
    let path = incident_path(incident.id);

    html! {
        div class="bg-gray-800 p-6 md:p-8 rounded-lg shadow-xl" {
            (title(html! {"Ocorrência #" (incident.id)}))

            div class="grid grid-cols-1 md:grid-cols-2 gap-6 mb-8" {
                (detail("Aluno:", Some(html! {
                    a href={"/students/" (incident.student_id)} class="hover:text-blue-300 underline" {(incident.student_name)}
                })))
                (detail("Data:", Some(incident.date_incident.format("%d/%m/%Y às %H:%M").to_string())))
                (detail("Registrada por:", Some(&incident.user_name)))
            }

            div class="mb-8" {
                p class="text-gray-300 text-sm mb-2" {"Descrição:"}
                p class="text-gray-100 leading-relaxed" {(multiline(&incident.description))}
            }
            div class="mb-8" {
                p class="text-gray-300 text-sm mb-2" {"Solução:"}
                @if let Some(soluction) = &incident.soluction {
                    p class="text-gray-100 leading-relaxed" {(multiline(soluction))}
                } @else {
                    p class="text-gray-500 italic" {"Nenhuma solução registrada."}
                }
            }

            div class="flex flex-row space-x-4" {
                (link_button(&format!("{path}/edit"), "Editar"))
                button class="bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded" hx-delete=(path) hx-confirm="Excluir esta ocorrência?" {
                    "Excluir"
                }
                (link_button("/incidents", "Voltar"))
            }
        }
    }
}

fn render_form(
    heading: &'static str,
    id: Option<i32>,
    draft: &IncidentDraft,
    errors: IncidentValidationError,
    students: &[Student],
) -> Markup {
    let selected_student = draft.student_id();
    let failed = errors.field_errors();
    let invalid = |field: &str| aria_invalid(&failed, field);

    let form_body = html! {
        (form_element("student_id", "Aluno", html! {
            select required id="student_id" name="student_id" aria-invalid=[invalid("student_id")] class=(INPUT_CLASSES) {
                option value="" {"Selecione um aluno"}
                @for student in students {
                    option value=(student.id) selected[selected_student == Some(student.id)] {(student.name)}
                }
            }
        }))
        (form_element("date_incident", "Data da ocorrência", html! {
            input required type="datetime-local" id="date_incident" name="date_incident" value=(draft.date_incident) aria-invalid=[invalid("date_incident")] class=(INPUT_CLASSES) {}
        }))
        (form_element("description", "Descrição", html! {
            textarea required id="description" name="description" rows="4" aria-invalid=[invalid("description")] class=(INPUT_CLASSES) {(draft.description)}
        }))
        (form_element("soluction", "Solução (opcional)", html! {
            textarea id="soluction" name="soluction" rows="3" class=(INPUT_CLASSES) {(draft.soluction)}
        }))
        (form_submit_button(None))
    };

    html! {
        div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full" {
            (title(heading))
            @if let Some(id) = id {
                form hx-put=(incident_path(id)) hx-target="main" hx-select="main" hx-swap="outerHTML" {
                    (form_body)
                }
            } @else {
                form method="post" action="/incidents" {
                    (form_body)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ChalkError, store::memory::MemoryStore};
    use pretty_assertions::assert_eq;

    const SIGN_IN_REQUIRED: &str = "Para continuar, efetue login ou registre-se.";

    async fn seeded(admin: bool) -> (MemoryStore, User, Student) {
        let store = MemoryStore::default();
        let user = store.add_user("Coordenação", admin).await;
        let student = store.add_student("Ana Souza").await;
        (store, user, student)
    }

    fn valid_form(student: &Student, user: &User) -> IncidentForm {
        IncidentForm {
            student_id: Some(student.id.to_string()),
            user_id: Some(user.id.to_string()),
            date_incident: Some("2016-05-02T09:15".into()),
            description: Some("Chegou atrasado e discutiu com o professor.".into()),
            soluction: Some("Conversa com a coordenação.".into()),
        }
    }

    fn nil_form(student: &Student, user: &User) -> IncidentForm {
        IncidentForm {
            student_id: Some(student.id.to_string()),
            user_id: Some(user.id.to_string()),
            date_incident: None,
            description: None,
            soluction: None,
        }
    }

    async fn existing_incident(store: &MemoryStore, student: &Student, user: &User) -> i32 {
        let Outcome::Redirect { to, .. } = create(store, Some(user), valid_form(student, user))
            .await
            .unwrap()
        else {
            panic!("valid incident should redirect");
        };
        to.trim_start_matches("/incidents/").parse().unwrap()
    }

    fn sign_in_redirect() -> Outcome<IncidentPage> {
        Outcome::redirect_with("/users/sign_in", Flash::alert(SIGN_IN_REQUIRED))
    }

    #[tokio::test]
    async fn signed_out_callers_are_redirected_and_change_nothing() {
        let (store, user, student) = seeded(true).await;
        let id = existing_incident(&store, &student, &user).await;

        assert_eq!(index(&store, None).await.unwrap(), sign_in_redirect());
        assert_eq!(new(None), sign_in_redirect());
        assert_eq!(show(&store, None, id).await.unwrap(), sign_in_redirect());
        assert_eq!(edit(&store, None, id).await.unwrap(), sign_in_redirect());
        assert_eq!(
            create(&store, None, valid_form(&student, &user)).await.unwrap(),
            sign_in_redirect()
        );
        assert_eq!(
            update(
                &store,
                None,
                id,
                IncidentForm {
                    description: Some("mudou".into()),
                    ..IncidentForm::default()
                }
            )
            .await
            .unwrap(),
            sign_in_redirect()
        );
        assert_eq!(destroy(&store, None, id).await.unwrap(), sign_in_redirect());

        assert_eq!(store.count_incidents().await.unwrap(), 1);
        let unchanged = store.find_incident(id).await.unwrap().unwrap();
        assert_eq!(
            unchanged.description,
            "Chegou atrasado e discutiu com o professor."
        );
    }

    #[tokio::test]
    async fn index_renders_list() {
        for admin in [true, false] {
            let (store, user, student) = seeded(admin).await;
            existing_incident(&store, &student, &user).await;

            let Outcome::Render {
                page: IncidentPage::Index(incidents),
                flash: None,
            } = index(&store, Some(&user)).await.unwrap()
            else {
                panic!("index should render the list");
            };
            assert_eq!(incidents.len(), 1);
            assert_eq!(incidents[0].student_name, "Ana Souza");
        }
    }

    #[tokio::test]
    async fn index_lists_newest_incident_first() {
        let (store, user, student) = seeded(false).await;
        let from_2016 = existing_incident(&store, &student, &user).await;
        let Outcome::Redirect { to, .. } = create(
            &store,
            Some(&user),
            IncidentForm {
                date_incident: Some("2015-01-01T08:00".into()),
                ..valid_form(&student, &user)
            },
        )
        .await
        .unwrap()
        else {
            panic!("valid incident should redirect");
        };
        let from_2015: i32 = to.trim_start_matches("/incidents/").parse().unwrap();
        let also_2016 = existing_incident(&store, &student, &user).await;

        let Outcome::Render {
            page: IncidentPage::Index(incidents),
            ..
        } = index(&store, Some(&user)).await.unwrap()
        else {
            panic!("index should render the list");
        };

        let ids: Vec<i32> = incidents.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![also_2016, from_2016, from_2015]);
    }

    #[tokio::test]
    async fn update_bumps_updated_at_only() {
        let (store, user, student) = seeded(true).await;
        let id = existing_incident(&store, &student, &user).await;
        let before = store.find_incident(id).await.unwrap().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        update(
            &store,
            Some(&user),
            id,
            IncidentForm {
                soluction: Some("Advertência por escrito.".into()),
                ..IncidentForm::default()
            },
        )
        .await
        .unwrap();

        let after = store.find_incident(id).await.unwrap().unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn show_binds_requested_incident_every_time() {
        for admin in [true, false] {
            let (store, user, student) = seeded(admin).await;
            let id = existing_incident(&store, &student, &user).await;
            let expected = store.find_incident(id).await.unwrap().unwrap();

            let first = show(&store, Some(&user), id).await.unwrap();
            let second = show(&store, Some(&user), id).await.unwrap();

            assert_eq!(first, Outcome::render(IncidentPage::Show(expected)));
            assert_eq!(first, second);
        }
    }

    #[tokio::test]
    async fn new_renders_blank_form() {
        for admin in [true, false] {
            let (_store, user, _student) = seeded(admin).await;

            assert_eq!(
                new(Some(&user)),
                Outcome::render(IncidentPage::New {
                    draft: IncidentDraft::default(),
                    errors: IncidentValidationError::empty(),
                })
            );
        }
    }

    #[tokio::test]
    async fn valid_create_adds_one_and_redirects_to_it() {
        for admin in [true, false] {
            let (store, user, student) = seeded(admin).await;

            let outcome = create(&store, Some(&user), valid_form(&student, &user))
                .await
                .unwrap();

            assert_eq!(store.count_incidents().await.unwrap(), 1);
            let newest = store.all_incidents().await.unwrap().remove(0);
            assert_eq!(outcome, Outcome::redirect(format!("/incidents/{}", newest.id)));
            assert_eq!(newest.user_id, user.id);
            assert_eq!(newest.student_id, student.id);
        }
    }

    #[tokio::test]
    async fn invalid_create_saves_nothing_and_reports_errors() {
        for admin in [true, false] {
            let (store, user, student) = seeded(admin).await;

            let outcome = create(&store, Some(&user), nil_form(&student, &user))
                .await
                .unwrap();

            assert_eq!(store.count_incidents().await.unwrap(), 0);
            let Outcome::Render {
                page: IncidentPage::New { .. },
                flash: Some(Flash::Error(messages)),
            } = &outcome
            else {
                panic!("invalid create should re-render the new form, got {outcome:?}");
            };
            assert_eq!(
                messages,
                &vec![
                    "Data da ocorrência não pode ficar em branco".to_string(),
                    "Descrição não pode ficar em branco".to_string(),
                ]
            );

            let again = create(&store, Some(&user), nil_form(&student, &user))
                .await
                .unwrap();
            assert_eq!(again.flash(), outcome.flash());
        }
    }

    #[tokio::test]
    async fn create_for_unknown_student_is_invalid() {
        let (store, user, student) = seeded(true).await;
        let form = IncidentForm {
            student_id: Some((student.id + 100).to_string()),
            ..valid_form(&student, &user)
        };

        let outcome = create(&store, Some(&user), form).await.unwrap();

        assert_eq!(store.count_incidents().await.unwrap(), 0);
        assert_eq!(
            outcome.flash(),
            Some(&Flash::Error(vec!["Aluno deve existir".to_string()]))
        );
    }

    #[tokio::test]
    async fn valid_update_flashes_success_and_redirects() {
        for admin in [true, false] {
            let (store, user, student) = seeded(admin).await;
            let id = existing_incident(&store, &student, &user).await;

            let outcome = update(
                &store,
                Some(&user),
                id,
                IncidentForm {
                    description: Some("A new description".into()),
                    ..IncidentForm::default()
                },
            )
            .await
            .unwrap();

            assert_eq!(
                outcome,
                Outcome::redirect_with(
                    format!("/incidents/{id}"),
                    Flash::success("Ocorrência atualizada com sucesso")
                )
            );
            let updated = store.find_incident(id).await.unwrap().unwrap();
            assert_eq!(updated.description, "A new description");
            assert_eq!(updated.soluction.as_deref(), Some("Conversa com a coordenação."));
        }
    }

    #[tokio::test]
    async fn invalid_update_renders_edit_with_errors() {
        for admin in [true, false] {
            let (store, user, student) = seeded(admin).await;
            let id = existing_incident(&store, &student, &user).await;
            let before = store.find_incident(id).await.unwrap().unwrap();

            let outcome = update(
                &store,
                Some(&user),
                id,
                IncidentForm {
                    description: Some(String::new()),
                    ..IncidentForm::default()
                },
            )
            .await
            .unwrap();

            let Outcome::Render {
                page: IncidentPage::Edit { id: edited, .. },
                flash: Some(Flash::Error(messages)),
            } = outcome
            else {
                panic!("invalid update should re-render the edit form");
            };
            assert_eq!(edited, id);
            assert_eq!(messages, vec!["Descrição não pode ficar em branco".to_string()]);
            assert_eq!(store.find_incident(id).await.unwrap().unwrap(), before);
        }
    }

    #[tokio::test]
    async fn destroy_removes_one_and_redirects_to_index() {
        for admin in [true, false] {
            let (store, user, student) = seeded(admin).await;
            let id = existing_incident(&store, &student, &user).await;

            let outcome = destroy(&store, Some(&user), id).await.unwrap();

            assert_eq!(store.count_incidents().await.unwrap(), 0);
            assert_eq!(
                outcome,
                Outcome::redirect_with(
                    "/incidents",
                    Flash::success("Ocorrência excluída com sucesso")
                )
            );
        }
    }

    #[tokio::test]
    async fn refused_destroy_keeps_incident_and_flashes_error() {
        for admin in [true, false] {
            let (store, user, student) = seeded(admin).await;
            let id = existing_incident(&store, &student, &user).await;
            store.refuse_deletes();

            let outcome = destroy(&store, Some(&user), id).await.unwrap();

            assert_eq!(store.count_incidents().await.unwrap(), 1);
            assert_eq!(
                outcome,
                Outcome::redirect_with("/incidents", Flash::error("Erro ao excluir ocorrência"))
            );
        }
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (store, user, _student) = seeded(false).await;

        assert!(matches!(
            show(&store, Some(&user), 404).await,
            Err(ChalkError::MissingIncident { id: 404 })
        ));
        assert!(matches!(
            edit(&store, Some(&user), 404).await,
            Err(ChalkError::MissingIncident { id: 404 })
        ));
        assert!(matches!(
            update(&store, Some(&user), 404, IncidentForm::default()).await,
            Err(ChalkError::MissingIncident { id: 404 })
        ));
        assert!(matches!(
            destroy(&store, Some(&user), 404).await,
            Err(ChalkError::MissingIncident { id: 404 })
        ));
    }

    #[test]
    fn long_descriptions_are_cut_short() {
        let long = "a".repeat(100);
        assert_eq!(summary(&long).chars().count(), 81);
        assert_eq!(summary("curta"), "curta");
    }

    #[test]
    fn form_preselects_student() {
        let now = chrono::Utc::now();
        let students = vec![Student {
            id: 7,
            name: "Bruno".into(),
            responsible: None,
            contact_responsible: None,
            date_enrolment: None,
            image: None,
            status: true,
            created_at: now,
            updated_at: now,
        }];
        let draft = IncidentDraft {
            student_id: "7".into(),
            ..IncidentDraft::default()
        };

        let markup = render_form(
            "Editar ocorrência",
            Some(1),
            &draft,
            IncidentValidationError::empty(),
            &students,
        )
        .into_string();
        assert!(markup.contains(r#"<option value="7" selected>Bruno</option>"#));
        assert!(markup.contains(r#"hx-put="/incidents/1""#));
        assert!(!markup.contains("aria-invalid"));
    }

    #[tokio::test]
    async fn failed_fields_are_marked_invalid() {
        let (store, user, student) = seeded(false).await;

        let Outcome::Render {
            page: IncidentPage::New { draft, errors },
            ..
        } = create(&store, Some(&user), nil_form(&student, &user))
            .await
            .unwrap()
        else {
            panic!("invalid create should re-render the new form");
        };
        let markup = render_form("Nova ocorrência", None, &draft, errors, &[]).into_string();

        assert!(markup.contains(r#"name="date_incident" value="" aria-invalid="true""#));
        assert!(markup.contains(r#"name="description" rows="4" aria-invalid="true""#));
        assert!(!markup.contains(r#"name="student_id" aria-invalid"#));
    }
}

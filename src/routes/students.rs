use crate::{
    auth::{Access, ChalkSession, authorize},
    data::{
        incident::Incident,
        aria_invalid,
        student::{Student, StudentDraft, StudentForm, StudentValidationError},
        user::User,
    },
    error::{ChalkResult, MissingStudentSnafu},
    flash::Flash,
    maud_conveniences::{
        INPUT_CLASSES, detail, form_element, form_submit_button, link_button, render_table,
        simple_form_element, title,
    },
    routes::outcome::{HxRequest, Outcome},
    state::ChalkState,
    store::{IncidentStore, StudentStore},
};
use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use axum_login::tower_sessions::Session;
use maud::{Markup, html};
use snafu::OptionExt;
use std::future;

pub const CREATED: &str = "Aluno cadastrado com sucesso";
pub const UPDATED: &str = "Aluno atualizado com sucesso";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentPage {
    Index(Vec<Student>),
    Show {
        student: Student,
        incidents: Vec<Incident>,
    },
    New {
        draft: StudentDraft,
        errors: StudentValidationError,
    },
    Edit {
        id: i32,
        draft: StudentDraft,
        errors: StudentValidationError,
    },
}

fn student_path(id: i32) -> String {
    format!("/students/{id}")
}

pub async fn index<S: StudentStore>(
    store: &S,
    identity: Option<&User>,
) -> ChalkResult<Outcome<StudentPage>> {
    if let Access::Denied(denial) = authorize(identity) {
        return Ok(denial.into());
    }

    Ok(Outcome::render(StudentPage::Index(
        store.all_students().await?,
    )))
}

pub async fn show<S: StudentStore + IncidentStore>(
    store: &S,
    identity: Option<&User>,
    id: i32,
) -> ChalkResult<Outcome<StudentPage>> {
    if let Access::Denied(denial) = authorize(identity) {
        return Ok(denial.into());
    }

    let student = store
        .find_student(id)
        .await?
        .context(MissingStudentSnafu { id })?;
    let incidents = store.incidents_for_student(id).await?;

    Ok(Outcome::render(StudentPage::Show { student, incidents }))
}

pub fn new(identity: Option<&User>) -> Outcome<StudentPage> {
    match authorize(identity) {
        Access::Denied(denial) => denial.into(),
        Access::Allowed(_) => Outcome::render(StudentPage::New {
            draft: StudentDraft::blank(),
            errors: StudentValidationError::empty(),
        }),
    }
}

pub async fn edit<S: StudentStore>(
    store: &S,
    identity: Option<&User>,
    id: i32,
) -> ChalkResult<Outcome<StudentPage>> {
    if let Access::Denied(denial) = authorize(identity) {
        return Ok(denial.into());
    }

    let student = store
        .find_student(id)
        .await?
        .context(MissingStudentSnafu { id })?;
    Ok(Outcome::render(StudentPage::Edit {
        id,
        draft: StudentDraft::from_existing(&student),
        errors: StudentValidationError::empty(),
    }))
}

pub async fn create<S: StudentStore>(
    store: &S,
    identity: Option<&User>,
    form: StudentForm,
) -> ChalkResult<Outcome<StudentPage>> {
    let user = match authorize(identity) {
        Access::Allowed(user) => user,
        Access::Denied(denial) => return Ok(denial.into()),
    };

    let draft = StudentDraft::blank().apply(form);
    match draft.validate() {
        Ok(new) => {
            let id = store.create_student(new).await?;
            info!(id, user = ?user.id, "Created student");
            Ok(Outcome::redirect_with(student_path(id), Flash::success(CREATED)))
        }
        Err(errors) => Ok(Outcome::render_with(
            StudentPage::New { draft, errors },
            Flash::Error(errors.full_messages()),
        )),
    }
}

pub async fn update<S: StudentStore>(
    store: &S,
    identity: Option<&User>,
    id: i32,
    form: StudentForm,
) -> ChalkResult<Outcome<StudentPage>> {
    let user = match authorize(identity) {
        Access::Allowed(user) => user,
        Access::Denied(denial) => return Ok(denial.into()),
    };

    let student = store
        .find_student(id)
        .await?
        .context(MissingStudentSnafu { id })?;
    let draft = StudentDraft::from_existing(&student).apply(form);

    match draft.validate() {
        Ok(new) => {
            store.update_student(id, new).await?;
            info!(id, user = ?user.id, "Updated student");
            Ok(Outcome::redirect_with(student_path(id), Flash::success(UPDATED)))
        }
        Err(errors) => Ok(Outcome::render_with(
            StudentPage::Edit { id, draft, errors },
            Flash::Error(errors.full_messages()),
        )),
    }
}

pub async fn get_students(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
) -> ChalkResult<Response> {
    let outcome = index(&state.store(), auth.user.as_ref()).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| future::ready(Ok(render_page(page))))
        .await
}

pub async fn get_student(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Path(id): Path<i32>,
) -> ChalkResult<Response> {
    let outcome = show(&state.store(), auth.user.as_ref(), id).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| future::ready(Ok(render_page(page))))
        .await
}

pub async fn get_new_student(
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
) -> ChalkResult<Response> {
    let outcome = new(auth.user.as_ref());
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| future::ready(Ok(render_page(page))))
        .await
}

pub async fn get_edit_student(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Path(id): Path<i32>,
) -> ChalkResult<Response> {
    let outcome = edit(&state.store(), auth.user.as_ref(), id).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| future::ready(Ok(render_page(page))))
        .await
}

pub async fn post_new_student(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Form(form): Form<StudentForm>,
) -> ChalkResult<Response> {
    let outcome = create(&state.store(), auth.user.as_ref(), form).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| future::ready(Ok(render_page(page))))
        .await
}

pub async fn put_student(
    State(state): State<ChalkState>,
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Path(id): Path<i32>,
    Form(form): Form<StudentForm>,
) -> ChalkResult<Response> {
    let outcome = update(&state.store(), auth.user.as_ref(), id, form).await?;
    outcome
        .respond(&session, auth.user.as_ref(), hx, |page| future::ready(Ok(render_page(page))))
        .await
}

fn render_page(page: StudentPage) -> Markup {
    match page {
        StudentPage::Index(students) => render_index(students),
        StudentPage::Show { student, incidents } => render_show(&student, incidents),
        StudentPage::New { draft, errors } => render_form("Novo aluno", None, &draft, errors),
        StudentPage::Edit { id, draft, errors } => {
            render_form("Editar aluno", Some(id), &draft, errors)
        }
    }
}

fn status_label(status: bool) -> &'static str {
    if status { "Ativo" } else { "Inativo" }
}

fn render_index(students: Vec<Student>) -> Markup {
    let rows = students
        .into_iter()
        .map(|student| {
            [
                html! {
                    a href=(student_path(student.id)) class="hover:text-blue-300 underline" {(student.name)}
                },
                html! {(student.responsible.unwrap_or_default())},
                html! {(student.contact_responsible.unwrap_or_default())},
                html! {(status_label(student.status))},
            ]
        })
        .collect::<Vec<_>>();

    html! {
        div class="flex flex-row items-center justify-between mb-4" {
            (title("Alunos"))
            (link_button("/students/new", "Novo aluno"))
        }
        @if rows.is_empty() {
            p class="text-gray-400 italic" {"Nenhum aluno cadastrado."}
        } @else {
            (render_table(["Nome", "Responsável", "Contato", "Situação"], rows))
        }
    }
}

fn render_show(student: &Student, incidents: Vec<Incident>) -> Markup {
    let path = student_path(student.id);
    let incident_rows = incidents
        .into_iter()
        .map(|incident| {
            [
                html! {
                    a href={"/incidents/" (incident.id)} class="hover:text-blue-300 underline" {
                        (incident.date_incident.format("%d/%m/%Y %H:%M"))
                    }
                },
                html! {(incident.description)},
                html! {(incident.user_name)},
            ]
        })
        .collect::<Vec<_>>();

    html! {
        div class="bg-gray-800 p-6 md:p-8 rounded-lg shadow-xl mb-8" {
            div class="flex flex-row items-center space-x-6 mb-6" {
                @if let Some(image) = &student.image {
                    img src=(image) alt=(student.name) class="w-24 h-24 rounded-full object-cover" {}
                }
                (title(&student.name))
            }

            div class="grid grid-cols-1 md:grid-cols-2 gap-6 mb-8" {
                (detail("Responsável:", student.responsible.as_ref()))
                (detail("Contato do responsável:", student.contact_responsible.as_ref()))
                (detail("Data de matrícula:", student.date_enrolment.map(|d| d.format("%d/%m/%Y").to_string())))
                (detail("Situação:", Some(status_label(student.status))))
            }

            div class="flex flex-row space-x-4" {
                (link_button(&format!("{path}/edit"), "Editar"))
                (link_button("/students", "Voltar"))
            }
        }

        h2 class="text-xl font-semibold mb-4" {"Ocorrências"}
        @if incident_rows.is_empty() {
            p class="text-gray-400 italic" {"Nenhuma ocorrência para este aluno."}
        } @else {
            (render_table(["Data", "Descrição", "Registrada por"], incident_rows))
        }
    }
}

fn render_form(
    heading: &'static str,
    id: Option<i32>,
    draft: &StudentDraft,
    errors: StudentValidationError,
) -> Markup {
    let failed = errors.field_errors();

    let form_body = html! {
        (form_element("name", "Nome", html! {
            input required type="text" id="name" name="name" value=(draft.name) aria-invalid=[aria_invalid(&failed, "name")] class=(INPUT_CLASSES) {}
        }))
        (simple_form_element("responsible", "Responsável", false, None, Some(&draft.responsible)))
        (simple_form_element("contact_responsible", "Contato do responsável", false, Some("tel"), Some(&draft.contact_responsible)))
        (form_element("date_enrolment", "Data de matrícula", html! {
            input type="date" id="date_enrolment" name="date_enrolment" value=(draft.date_enrolment) aria-invalid=[aria_invalid(&failed, "date_enrolment")] class=(INPUT_CLASSES) {}
        }))
        (simple_form_element("image", "Foto (URL)", false, Some("url"), Some(&draft.image)))
        (form_element("status", "Ativo", html! {
            input type="hidden" name="has_status" value="true" {}
            input type="checkbox" id="status" name="status" checked[draft.status] class=(INPUT_CLASSES) {}
        }))
        (form_submit_button(None))
    };

    html! {
        div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full" {
            (title(heading))
            @if let Some(id) = id {
                form hx-put=(student_path(id)) hx-target="main" hx-select="main" hx-swap="outerHTML" {
                    (form_body)
                }
            } @else {
                form method="post" action="/students" {
                    (form_body)
                }
            }
        }
    }
}

use crate::{auth::SIGN_IN_PATH, data::user::User, flash::Flash};
use maud::{DOCTYPE, Markup, Render, html};

pub const INPUT_CLASSES: &str = "shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";

pub fn render_nav(user: Option<&User>) -> Markup {
    html! {
        nav class="w-full bg-gray-800 shadow-md" {
            div class="max-w-4xl mx-auto px-4 py-3 flex flex-row items-center justify-between" {
                div class="flex flex-row space-x-4" {
                    a href="/" class="font-semibold" {"Chalk"}
                    @if user.is_some() {
                        a href="/incidents" class="hover:text-blue-300" {"Ocorrências"}
                        a href="/students" class="hover:text-blue-300" {"Alunos"}
                    }
                }
                @if let Some(user) = user {
                    form method="post" action="/users/sign_out" class="flex flex-row items-center space-x-4" {
                        span class="text-gray-300" title=(user.email) {
                            (user)
                            @if user.admin {
                                " "
                                span class="italic text-sm" {"(admin)"}
                            }
                        }
                        button type="submit" class="bg-gray-700 hover:bg-gray-600 py-1 px-3 rounded" {"Sair"}
                    }
                } @else {
                    div class="flex flex-row space-x-4" {
                        a href=(SIGN_IN_PATH) class="hover:text-blue-300" {"Entrar"}
                        a href="/users/sign_up" class="hover:text-blue-300" {"Registrar-se"}
                    }
                }
            }
        }
    }
}

///the whole document: head, nav, then any flashes above the page itself
pub fn layout(user: Option<&User>, flashes: &[Flash], markup: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8" {}
                meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                title { "Chalk" }
            }
            body class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                (render_nav(user))
                main class="w-full max-w-4xl px-4 py-8" {
                    @for flash in flashes {
                        (flash)
                    }
                    (markup)
                }
            }
        }
    }
}

pub fn render_table<const N: usize>(titles: [&'static str; N], items: Vec<[Markup; N]>) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr {
                        @for title in titles {
                            th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                        }
                    }
                }
                tbody {
                    @for row in items {
                        tr {
                            @for col in row {
                                td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, input: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (input)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    ty: Option<&'static str>,
    value: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required[required] type=(ty.unwrap_or("text")) id=(id) name=(id) value=[value] class=(INPUT_CLASSES) {}
        },
    )
}

pub fn form_submit_button(text: Option<&str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (text.unwrap_or("Salvar"))
            }
        }
    }
}

pub fn link_button(href: &str, text: &'static str) -> Markup {
    html! {
        a href=(href) class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {(text)}
    }
}

///label on top, value underneath - for detail pages
pub fn detail(label: &'static str, value: Option<impl Render>) -> Markup {
    html! {
        div {
            p class="text-gray-300 text-sm" {(label)}
            @if let Some(value) = value {
                p class="text-gray-100 text-lg" {(value)}
            } @else {
                p class="text-gray-500 text-lg italic" {"Não informado"}
            }
        }
    }
}

///keeps line breaks from textareas
pub fn multiline(text: &str) -> Markup {
    html! {
        @for line in text.lines() {
            (line)
            br;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use uuid::Uuid;

    #[test]
    fn nav_shows_who_is_signed_in() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Diretora".into(),
            email: "diretora@escola.example".into(),
            bcrypt_hashed_password: SecretString::from("$2b$04$not.a.real.hash"),
            admin: true,
        };

        let nav = render_nav(Some(&user)).into_string();
        assert!(nav.contains(r#"title="diretora@escola.example""#));
        assert!(nav.contains("(admin)"));

        let signed_out = render_nav(None).into_string();
        assert!(signed_out.contains(r#"href="/users/sign_in""#));
        assert!(!signed_out.contains("Sair"));
    }

    #[test]
    fn layout_puts_flashes_above_the_page() {
        let page = layout(
            None,
            &[Flash::alert("Para continuar, efetue login ou registre-se.")],
            html! { p {"conteúdo"} },
        )
        .into_string();

        let flash_at = page.find("Para continuar").unwrap();
        let content_at = page.find("conteúdo").unwrap();
        assert!(flash_at < content_at);
        assert!(page.starts_with("<!DOCTYPE html>"));
    }
}

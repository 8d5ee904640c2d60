pub mod blog;
pub mod comment;
pub mod token;
pub mod user;
pub mod wishlist;

use actix_web::{get, web, HttpResponse, Responder};

/// Registers every route. Fixed paths come before their `{id}` siblings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        //Framework routes
        .service(index)
        .service(favicon)
        //Token routes
        .service(token::login)
        .service(token::logout)
        //User routes
        .service(user::user_exists)
        .service(user::get_user)
        .service(user::create_user)
        .service(user::update_user)
        .service(user::delete_user)
        //Blog routes
        .service(blog::get_blogs)
        .service(blog::search_blogs)
        .service(blog::recent_blogs)
        .service(blog::recent_blogs_limited)
        .service(blog::top_blogs)
        .service(blog::get_blog)
        .service(blog::create_blog)
        .service(blog::update_blog)
        .service(blog::delete_blog)
        //Comment routes
        .service(comment::get_comments)
        .service(comment::create_comment)
        .service(comment::update_comment)
        .service(comment::delete_comment)
        //Wishlist routes
        .service(wishlist::get_wishlist)
        .service(wishlist::search_wishlist)
        .service(wishlist::check_wishlist)
        .service(wishlist::add_to_wishlist)
        .service(wishlist::remove_from_wishlist);
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Blog server is running")
}

#[get("/favicon.ico")]
pub async fn favicon() -> impl Responder {
    HttpResponse::NoContent().finish()
}
